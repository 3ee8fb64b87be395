use wgpu_text::glyph_brush::{
    BuiltInLineBreaker, HorizontalAlign, Layout, OwnedSection, OwnedText, VerticalAlign,
};

use crate::control_state::{ControlState, View};
use crate::gallery::MODELS;
use crate::markup::{self, Emphasis};
use crate::palette;
use crate::registry::describe;

const MARGIN: f32 = 40.0;
const HOVER_OFFSET: f32 = 16.0;
const LEFT_COLUMN: f32 = 0.38;

#[derive(Clone, Debug, Copy)]
pub enum SectionName {
    Top = 0,
    Left = 1,
    Bottom = 2,
    Hover = 3,
}

impl SectionName {
    const fn count() -> usize {
        4
    }
}

#[derive(Clone, Copy)]
enum Size {
    Normal,
    Large,
}

impl Size {
    fn scale(self) -> f32 {
        match self {
            Size::Normal => 22.0,
            Size::Large => 40.0,
        }
    }
}

fn text(content: impl Into<String>, color: u32, size: Size) -> OwnedText {
    OwnedText::new(content)
        .with_color(palette::srgb_rgba(color, 1.0))
        .with_scale(size.scale())
}

/// The overlay text, rebuilt whenever the control state, the legend or the
/// window changes.
#[derive(Clone, Debug)]
pub struct TextState {
    width: f32,
    height: f32,
    control_state: ControlState,
    legend: Vec<&'static str>,
    hover_anchor: Option<[f32; 2]>,
    sections: [Option<OwnedSection>; SectionName::count()],
}

impl TextState {
    pub fn new(width: u32, height: u32) -> Self {
        let mut fresh = Self {
            width: width as f32,
            height: height as f32,
            control_state: ControlState::default(),
            legend: Vec::new(),
            hover_anchor: None,
            sections: Default::default(),
        };
        fresh.update_sections();
        fresh
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
        self.update_sections();
    }

    pub fn update(&mut self, control_state: &ControlState, legend: Vec<&'static str>) {
        if self.control_state == *control_state && self.legend == legend {
            return;
        }
        self.control_state = control_state.clone();
        self.legend = legend;
        self.update_sections();
    }

    /// Where the hovered leg's label sits on screen; `None` hides it.
    pub fn set_hover_anchor(&mut self, hover_anchor: Option<[f32; 2]>) {
        if self.hover_anchor != hover_anchor {
            self.hover_anchor = hover_anchor;
            self.update_section(SectionName::Hover);
        }
    }

    pub fn sections(&self) -> Vec<&OwnedSection> {
        self.sections.iter().flatten().collect()
    }

    pub fn section(&self, section_name: SectionName) -> Option<&OwnedSection> {
        self.sections[section_name as usize].as_ref()
    }

    fn update_sections(&mut self) {
        for section_name in [
            SectionName::Top,
            SectionName::Left,
            SectionName::Bottom,
            SectionName::Hover,
        ] {
            self.update_section(section_name);
        }
    }

    fn update_section(&mut self, section_name: SectionName) {
        let texts = self.texts(section_name);
        self.sections[section_name as usize] = (!texts.is_empty()).then(|| {
            self.create_section(section_name)
                .with_text(texts)
        });
    }

    fn texts(&self, section_name: SectionName) -> Vec<OwnedText> {
        let view = self.control_state.view();
        match (section_name, view) {
            (SectionName::Top, View::Simulator) => {
                let title = describe(self.control_state.phase()).title;
                vec![text(title, palette::TEXT_STRONG, Size::Large)]
            }
            (SectionName::Top, View::Gallery) => {
                vec![text("Model Gallery", palette::TEXT_STRONG, Size::Large)]
            }
            (SectionName::Left, View::Simulator) => self.description(),
            (SectionName::Left, View::Gallery) => Self::gallery(),
            (SectionName::Bottom, _) if !self.legend.is_empty() => {
                vec![text(self.legend.join("   "), palette::TEXT, Size::Normal)]
            }
            (SectionName::Hover, View::Simulator) => match (self.control_state.hovered(), self.hover_anchor) {
                (Some(leg_type), Some(_)) => {
                    vec![text(leg_type.to_string(), palette::TEXT_STRONG, Size::Normal)]
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn description(&self) -> Vec<OwnedText> {
        let body = describe(self.control_state.phase()).body;
        let paragraphs = markup::paragraphs(body);
        let count = paragraphs.len();
        paragraphs
            .into_iter()
            .enumerate()
            .flat_map(|(index, paragraph)| {
                let separator = (index + 1 < count).then(|| text("\n\n", palette::TEXT, Size::Normal));
                paragraph
                    .into_iter()
                    .map(|span| match span.emphasis {
                        Emphasis::Plain => text(span.text, palette::TEXT, Size::Normal),
                        Emphasis::Bold => text(span.text, palette::TEXT_STRONG, Size::Normal),
                    })
                    .chain(separator)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn gallery() -> Vec<OwnedText> {
        MODELS
            .iter()
            .flat_map(|model| {
                [
                    text(format!("{}\n", model.title), palette::TEXT_STRONG, Size::Normal),
                    text(format!("{}\n", model.credit()), palette::TEXT, Size::Normal),
                    text(format!("{}\n", model.model_url()), palette::LINK, Size::Normal),
                    text(format!("{}\n\n", model.author_url()), palette::LINK, Size::Normal),
                ]
            })
            .collect()
    }

    fn create_section(&self, section_name: SectionName) -> OwnedSection {
        OwnedSection::default()
            .with_layout(Self::create_layout(section_name))
            .with_bounds(self.create_bounds(section_name))
            .with_screen_position(self.create_position(section_name))
    }

    fn create_layout(section_name: SectionName) -> Layout<BuiltInLineBreaker> {
        use SectionName::*;
        Layout::default()
            .v_align(match section_name {
                Top | Left => VerticalAlign::Top,
                Bottom | Hover => VerticalAlign::Bottom,
            })
            .h_align(match section_name {
                Top | Bottom | Hover => HorizontalAlign::Center,
                Left => HorizontalAlign::Left,
            })
    }

    fn create_bounds(&self, section_name: SectionName) -> [f32; 2] {
        use SectionName::*;
        match section_name {
            Top | Bottom => [self.width, self.height],
            Left => [self.width * LEFT_COLUMN, self.height],
            Hover => [self.width / 4.0, self.height],
        }
    }

    fn create_position(&self, section_name: SectionName) -> [f32; 2] {
        use SectionName::*;
        let middle_h = self.width / 2.0;
        match section_name {
            Top => [middle_h, MARGIN],
            Left => [MARGIN, MARGIN * 3.0],
            Bottom => [middle_h, self.height - MARGIN],
            Hover => {
                let [x, y] = self.hover_anchor.unwrap_or_default();
                [x, y - HOVER_OFFSET]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{GaitPhase, LegType};

    fn joined(section: Option<&OwnedSection>) -> String {
        section
            .map(|section| section.text.iter().map(|text| text.text.as_str()).collect())
            .unwrap_or_default()
    }

    fn state(control_state: &ControlState) -> TextState {
        let mut text_state = TextState::new(1600, 1200);
        text_state.update(control_state, vec!["ESC to quit"]);
        text_state
    }

    #[test]
    fn simulator_shows_title_and_description() {
        let text_state = state(&ControlState::new(GaitPhase::Midstance, View::Simulator));
        assert_eq!(joined(text_state.section(SectionName::Top)), "Midstance");
        let left = joined(text_state.section(SectionName::Left));
        assert!(left.contains("Tibia:"));
        assert!(!left.contains("**"));
        assert_eq!(joined(text_state.section(SectionName::Bottom)), "ESC to quit");
        assert!(text_state.section(SectionName::Hover).is_none());
    }

    #[test]
    fn bold_spans_use_the_strong_color() {
        let text_state = state(&ControlState::default());
        let left = text_state.section(SectionName::Left).expect("description");
        let tibia = left
            .text
            .iter()
            .find(|text| text.text == "Tibia:")
            .expect("bold lead");
        assert_eq!(tibia.extra.color, palette::srgb_rgba(palette::TEXT_STRONG, 1.0));
    }

    #[test]
    fn hover_label_sits_above_its_anchor() {
        let mut control_state = ControlState::default();
        control_state.set_hovered(Some(LegType::Prosthetic));
        let mut text_state = state(&control_state);
        assert!(text_state.section(SectionName::Hover).is_none());
        text_state.set_hover_anchor(Some([100.0, 200.0]));
        let hover = text_state.section(SectionName::Hover).expect("hover label");
        assert_eq!(hover.screen_position, (100.0, 184.0));
        assert_eq!(joined(Some(hover)), LegType::Prosthetic.to_string());
        text_state.set_hover_anchor(None);
        assert!(text_state.section(SectionName::Hover).is_none());
    }

    #[test]
    fn gallery_lists_every_model() {
        let text_state = state(&ControlState::new(GaitPhase::StaticStand, View::Gallery));
        assert_eq!(joined(text_state.section(SectionName::Top)), "Model Gallery");
        let listing = joined(text_state.section(SectionName::Left));
        for model in &MODELS {
            assert!(listing.contains(model.title));
            assert!(listing.contains(&model.model_url()));
            assert!(listing.contains(&model.author_url()));
        }
    }
}
