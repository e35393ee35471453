//! Askama templates for the arrival board.

use askama::Template;

use super::dto::{LOADING_TEXT, StopView};

/// Full-page arrival board.
#[derive(Template)]
#[template(path = "board.html")]
pub struct BoardTemplate {
    /// `None` until the first schedule has been published.
    pub stops: Option<Vec<StopView>>,
    pub loading_text: &'static str,
}

impl BoardTemplate {
    pub fn new(stops: Option<Vec<StopView>>) -> Self {
        Self {
            stops,
            loading_text: LOADING_TEXT,
        }
    }
}
