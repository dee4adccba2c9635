pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{empty, error, header, info, success};
pub use table::stones_table;
pub use theme::{theme, Theme};
