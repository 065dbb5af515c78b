#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppView {
    Panel,
    Profiles,
}

impl AppView {
    pub fn name(&self) -> &'static str {
        match self {
            AppView::Panel => "Panel",
            AppView::Profiles => "Profiles",
        }
    }
}
