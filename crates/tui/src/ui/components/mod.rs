pub mod card;
pub mod modal;
pub mod money;
pub mod tabs;
pub mod toast;
