#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Theme {
    Winter,
    Nord,
    Dracula,
    Night,
}

impl Theme {
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Winter => "Winter",
            Theme::Nord => "Nord",
            Theme::Dracula => "Dracula",
            Theme::Night => "Night",
        }
    }

    pub fn data_theme(&self) -> &'static str {
        match self {
            Theme::Winter => "winter",
            Theme::Nord => "nord",
            Theme::Dracula => "dracula",
            Theme::Night => "night",
        }
    }

    pub fn from_id(id: &str) -> Option<Theme> {
        match id {
            "winter" => Some(Theme::Winter),
            "nord" => Some(Theme::Nord),
            "dracula" => Some(Theme::Dracula),
            "night" => Some(Theme::Night),
            _ => None,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dracula | Theme::Night)
    }

    pub fn dark_themes() -> Vec<Theme> {
        vec![Theme::Dracula, Theme::Night]
    }

    pub fn light_themes() -> Vec<Theme> {
        vec![Theme::Winter, Theme::Nord]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for theme in [Theme::Winter, Theme::Nord, Theme::Dracula, Theme::Night] {
            assert_eq!(Theme::from_id(theme.data_theme()), Some(theme));
        }
        assert_eq!(Theme::from_id("unknown"), None);
    }
}
