use dioxus::prelude::*;
use store::directory::CategoryIcon;

use crate::icons::{
    FaBook, FaBriefcase, FaDisplay, FaFilm, FaFutbol, FaGamepad, FaGraduationCap,
    FaHandsPraying, FaHeart, FaMoneyBill, FaMusic, FaPalette, FaPlane, FaStar, FaUsers,
    FaUtensils,
};
use crate::Icon;

#[component]
pub fn CategoryIconView(icon: CategoryIcon, #[props(default = 16)] size: u32) -> Element {
    match icon {
        CategoryIcon::Star => rsx! { Icon { icon: FaStar, width: size, height: size } },
        CategoryIcon::Heart => rsx! { Icon { icon: FaHeart, width: size, height: size } },
        CategoryIcon::Music => rsx! { Icon { icon: FaMusic, width: size, height: size } },
        CategoryIcon::Money => rsx! { Icon { icon: FaMoneyBill, width: size, height: size } },
        CategoryIcon::Spirit => rsx! { Icon { icon: FaHandsPraying, width: size, height: size } },
        CategoryIcon::Monitor => rsx! { Icon { icon: FaDisplay, width: size, height: size } },
        CategoryIcon::Sports => rsx! { Icon { icon: FaFutbol, width: size, height: size } },
        CategoryIcon::Book => rsx! { Icon { icon: FaBook, width: size, height: size } },
        CategoryIcon::Gamepad => rsx! { Icon { icon: FaGamepad, width: size, height: size } },
        CategoryIcon::Palette => rsx! { Icon { icon: FaPalette, width: size, height: size } },
        CategoryIcon::Plane => rsx! { Icon { icon: FaPlane, width: size, height: size } },
        CategoryIcon::Food => rsx! { Icon { icon: FaUtensils, width: size, height: size } },
        CategoryIcon::School => rsx! { Icon { icon: FaGraduationCap, width: size, height: size } },
        CategoryIcon::Briefcase => rsx! { Icon { icon: FaBriefcase, width: size, height: size } },
        CategoryIcon::Film => rsx! { Icon { icon: FaFilm, width: size, height: size } },
        CategoryIcon::Users => rsx! { Icon { icon: FaUsers, width: size, height: size } },
    }
}
