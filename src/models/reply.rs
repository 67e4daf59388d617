use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardButtonKind, InlineKeyboardMarkup,
    KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

/// An outbound chat message with its optional keyboard.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub markup: Option<ReplyMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: None,
        }
    }

    pub fn with_buttons(text: impl Into<String>, rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self {
            text: text.into(),
            markup: Some(ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows))),
        }
    }

    /// One-shot reply keyboard asking the client to share their phone number.
    pub fn request_contact(text: impl Into<String>, label: impl Into<String>) -> Self {
        let button = KeyboardButton::new(label).request(ButtonRequest::Contact);
        Self {
            text: text.into(),
            markup: Some(ReplyMarkup::Keyboard(
                KeyboardMarkup::new(vec![vec![button]])
                    .resize_keyboard()
                    .one_time_keyboard(),
            )),
        }
    }

    pub fn inline_rows(&self) -> &[Vec<InlineKeyboardButton>] {
        match &self.markup {
            Some(ReplyMarkup::InlineKeyboard(markup)) => markup.inline_keyboard.as_slice(),
            _ => &[],
        }
    }

    /// All callback payloads carried by the inline keyboard, row by row.
    pub fn callback_data(&self) -> Vec<&str> {
        self.inline_rows()
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.as_str()),
                _ => None,
            })
            .collect()
    }
}
