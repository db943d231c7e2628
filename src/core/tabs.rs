use crate::domain::model::RateType;
use crate::utils::error::RateError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Form(RateType),
    MyRates,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Form(RateType::Sea),
        Tab::Form(RateType::PreCarriage),
        Tab::Form(RateType::OnCarriage),
        Tab::Form(RateType::Terminal),
        Tab::Form(RateType::Customs),
        Tab::MyRates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Form(rate_type) => rate_type.as_str(),
            Tab::MyRates => "my_rates",
        }
    }

    pub fn rate_type(&self) -> Option<RateType> {
        match self {
            Tab::Form(rate_type) => Some(*rate_type),
            Tab::MyRates => None,
        }
    }

    fn index(&self) -> usize {
        Tab::ALL
            .iter()
            .position(|t| t == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        if normalized == "my_rates" {
            return Ok(Tab::MyRates);
        }
        normalized
            .parse::<RateType>()
            .map(Tab::Form)
            .map_err(|_| RateError::validation("tab", format!("Unknown tab '{}'", s)))
    }
}

/// What the newly shown tab needs before it is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabInit {
    /// Populate dropdowns and default dates of this rate form.
    PrepareForm(RateType),
    RefreshList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabTransition {
    /// `None` when the target was already active.
    pub deactivated: Option<Tab>,
    pub activated: Tab,
    pub init: TabInit,
}

/// Exactly one of the six tabs is visible at a time.
#[derive(Debug, Clone)]
pub struct TabController {
    visible: [bool; 6],
    active: Tab,
}

impl Default for TabController {
    fn default() -> Self {
        Self::new(Tab::Form(RateType::Sea))
    }
}

impl TabController {
    pub fn new(initial: Tab) -> Self {
        let mut controller = Self {
            visible: [false; 6],
            active: initial,
        };
        controller.show_only(initial);
        controller
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn is_visible(&self, tab: Tab) -> bool {
        self.visible[tab.index()]
    }

    pub fn visible_tabs(&self) -> Vec<Tab> {
        Tab::ALL
            .into_iter()
            .filter(|t| self.is_visible(*t))
            .collect()
    }

    fn show_only(&mut self, target: Tab) {
        for (slot, tab) in self.visible.iter_mut().zip(Tab::ALL) {
            *slot = tab == target;
        }
    }

    pub fn switch_to(&mut self, target: Tab) -> TabTransition {
        let previous = self.active;
        self.show_only(target);
        self.active = target;

        let init = match target {
            Tab::Form(rate_type) => TabInit::PrepareForm(rate_type),
            Tab::MyRates => TabInit::RefreshList,
        };
        tracing::debug!("Switched tab {} -> {}", previous, target);

        TabTransition {
            deactivated: (previous != target).then_some(previous),
            activated: target,
            init,
        }
    }
}
