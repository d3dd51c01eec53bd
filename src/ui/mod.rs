//! UI rendering modules for cfpwatch

mod cfp_detail;
mod cfp_list;
mod help_overlay;

pub use cfp_detail::render as render_cfp_detail;
pub use cfp_list::render as render_cfp_list;
pub use help_overlay::render as render_help_overlay;
