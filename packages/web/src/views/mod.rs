mod home;
pub use home::Home;

mod login;
pub use login::Login;

mod signup;
pub use signup::SignUp;

mod profile;
pub use profile::Profile;

mod create_community;
pub use create_community::CreateCommunity;

mod community_detail;
pub use community_detail::CommunityDetail;

mod not_found;
pub use not_found::NotFound;
