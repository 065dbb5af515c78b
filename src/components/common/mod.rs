mod alert;
mod confirm;
mod input_field;
mod modal;

pub use alert::AlertDialog;
pub use confirm::ConfirmDialog;
pub use input_field::TemplateInput;
pub use modal::Modal;
