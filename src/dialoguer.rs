use std::fmt;

use dialoguer::{theme::ColorfulTheme, Input};
use error_stack::{IntoReport, ResultExt};

#[derive(Debug)]
pub struct DialoguerError;

impl fmt::Display for DialoguerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dialoguer error")
    }
}

impl std::error::Error for DialoguerError {}

pub type DialoguerResult<T> = error_stack::Result<T, DialoguerError>;

#[derive(Debug, Clone)]
pub struct Dialoguer;

impl Dialoguer {
    pub fn input(prompt_text: String) -> DialoguerResult<String> {
        let colorful_theme = &ColorfulTheme::default();
        let mut input = Input::with_theme(colorful_theme);
        let dialog: String = input
            .with_prompt(&prompt_text)
            .interact_text()
            .into_report()
            .change_context(DialoguerError)?;

        Ok(dialog)
    }
}
