pub mod alert;
pub mod button;
pub mod input;
pub mod menu;
pub mod separator;
pub mod spinner;

// Re-export component symbols so callers can `use crate::components::ui::Button` etc.
pub use alert::*;
pub use button::*;
pub use input::*;
pub use menu::*;
#[allow(unused_imports)]
pub use separator::*;
pub use spinner::*;
