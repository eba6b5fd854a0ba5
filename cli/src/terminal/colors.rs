use colored::Color;

pub const PRIMARY: Color = Color::BrightBlue;
pub const ACCENT: Color = Color::BrightCyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const ARN: Color = Color::TrueColor { r: 130, g: 170, b: 255 };
pub const MISSING: Color = Color::Yellow;
pub const NO_TAGS: Color = Color::Red;
pub const REGION: Color = Color::Magenta;
