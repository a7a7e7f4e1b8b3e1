//! UI layer for desktop GUI: app shell, analysis and dashboard panes, transit painter.

pub mod app;
pub mod transit;

pub use app::DesktopGuiApp;
