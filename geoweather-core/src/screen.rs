//! Retained display state between renders.

use crate::{
    model::WeatherSnapshot,
    present::{DisplayModel, IconCategory, TemperatureUnit, render},
};

/// What is currently on screen and the snapshot it came from.
///
/// Unit toggles always re-render from the stored snapshot, and an unknown
/// icon code leaves the previously shown icon in place.
#[derive(Debug, Clone, Default)]
pub struct Screen {
    snapshot: Option<WeatherSnapshot>,
    unit: TemperatureUnit,
    icon: Option<IconCategory>,
    display: Option<DisplayModel>,
}

impl Screen {
    pub fn new(unit: TemperatureUnit) -> Self {
        Self { unit, ..Self::default() }
    }

    pub fn show(&mut self, snapshot: WeatherSnapshot) -> DisplayModel {
        let display = render(&snapshot, self.unit);
        self.snapshot = Some(snapshot);
        self.commit(display)
    }

    /// Switch units for the current render. Returns `None` if nothing has
    /// been shown yet.
    pub fn set_unit(&mut self, unit: TemperatureUnit) -> Option<DisplayModel> {
        self.unit = unit;
        self.rerender()
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn display(&self) -> Option<&DisplayModel> {
        self.display.as_ref()
    }

    fn rerender(&mut self) -> Option<DisplayModel> {
        let display = render(self.snapshot.as_ref()?, self.unit);
        Some(self.commit(display))
    }

    fn commit(&mut self, mut display: DisplayModel) -> DisplayModel {
        match display.icon {
            Some(icon) => self.icon = Some(icon),
            None => display.icon = self.icon,
        }

        self.display = Some(display.clone());
        display
    }
}
