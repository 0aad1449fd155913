//! Styled form primitives shared by every view.

mod button;
pub use button::{Button, ButtonVariant};

mod input;
pub use input::{Input, Label, Select, Textarea};
