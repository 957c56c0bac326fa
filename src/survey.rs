//! Survey definition builder.
//!
//! `build` turns a language and a session's image assignment into the declarative
//! page/question JSON the browser survey runtime renders. The structure (page order,
//! element names, required flags, image sets) depends only on the assignment; the
//! language only changes display text.

use serde::Serialize;
use serde_json::Value;

use crate::config::RuntimeSettings;
use crate::i18n::{Language, Prompt, StringTable};
use crate::images::{ImageAssignment, ImageChoice};

const FEEDBACK_MAX_LENGTH: u32 = 500;
const IMAGE_HEIGHT: &str = "300px";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDefinition {
    pub title: String,
    pub description: String,
    pub locale: Language,
    pub page_next_text: String,
    pub page_prev_text: String,
    pub complete_text: String,
    pub pages: Vec<Page>,
    #[serde(flatten)]
    pub settings: RuntimeSettings,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page {
    pub name: &'static str,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub elements: Vec<Element>,
}

/// One survey element, tagged the way the runtime expects (`"type": "imagepicker"`, ...).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Expression(Instruction),
    ImagePicker(ImagePicker),
    Image(ImageDisplay),
    Rating(RatingQuestion),
    RadioGroup(ChoiceQuestion),
    Checkbox(ChoiceQuestion),
    Ranking(ChoiceQuestion),
    Comment(TextQuestion),
}

/// Display type of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    SingleImageChoice,
    MultiImageChoice,
    RatingScale,
    SingleChoice,
    Checklist,
    Ranking,
    OpenText,
    /// Shows something, collects nothing.
    Display,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Instruction {
    pub name: &'static str,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImagePicker {
    pub name: &'static str,
    pub title: String,
    pub description: String,
    pub is_required: bool,
    pub choices: Vec<ImageChoice>,
    pub image_fit: &'static str,
    pub multi_select: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageDisplay {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
    pub image_fit: &'static str,
    pub image_height: &'static str,
    pub image_width: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Choice {
    pub value: Value,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceQuestion {
    pub name: &'static str,
    pub title: String,
    pub is_required: bool,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingQuestion {
    pub name: &'static str,
    pub title: String,
    pub is_required: bool,
    pub rate_values: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextQuestion {
    pub name: &'static str,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_required: bool,
    pub max_length: u32,
}

impl Element {
    pub fn name(&self) -> &'static str {
        match self {
            Element::Expression(e) => e.name,
            Element::ImagePicker(e) => e.name,
            Element::Image(e) => e.name,
            Element::Rating(e) => e.name,
            Element::RadioGroup(e) | Element::Checkbox(e) | Element::Ranking(e) => e.name,
            Element::Comment(e) => e.name,
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Element::Expression(_) | Element::Image(_) => QuestionKind::Display,
            Element::ImagePicker(p) if p.multi_select => QuestionKind::MultiImageChoice,
            Element::ImagePicker(_) => QuestionKind::SingleImageChoice,
            Element::Rating(_) => QuestionKind::RatingScale,
            Element::RadioGroup(_) => QuestionKind::SingleChoice,
            Element::Checkbox(_) => QuestionKind::Checklist,
            Element::Ranking(_) => QuestionKind::Ranking,
            Element::Comment(_) => QuestionKind::OpenText,
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            Element::Expression(_) | Element::Image(_) => false,
            Element::ImagePicker(e) => e.is_required,
            Element::Rating(e) => e.is_required,
            Element::RadioGroup(e) | Element::Checkbox(e) | Element::Ranking(e) => e.is_required,
            Element::Comment(e) => e.is_required,
        }
    }
}

impl SurveyDefinition {
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.pages.iter().flat_map(|p| p.elements.iter())
    }

    /// Names of elements that collect an answer, in survey order.
    pub fn question_names(&self) -> Vec<&'static str> {
        self.elements().filter(|e| e.kind() != QuestionKind::Display).map(Element::name).collect()
    }

    pub fn required_questions(&self) -> Vec<&'static str> {
        self.elements().filter(|e| e.is_required()).map(Element::name).collect()
    }

    #[cfg(test)]
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name() == name)
    }
}

/// Build the full survey for `lang` around an already-drawn image assignment.
pub fn build(lang: Language, images: &ImageAssignment, settings: &RuntimeSettings) -> SurveyDefinition {
    let t = lang.strings();
    SurveyDefinition {
        title: t.survey_title.into(),
        description: t.survey_description.into(),
        locale: lang,
        page_next_text: t.next.into(),
        page_prev_text: t.previous.into(),
        complete_text: t.complete.into(),
        pages: vec![
            demographics_page(t),
            thermal_page(t, images),
            environmental_page(t, images),
            design_quality_page(t, images),
            emotional_page(t, images),
            ranking_page(t, images),
        ],
        settings: settings.clone(),
    }
}

fn page(name: &'static str, prompt: &Prompt, elements: Vec<Element>) -> Page {
    Page {
        name,
        title: prompt.title.into(),
        description: Some(prompt.desc.into()),
        elements,
    }
}

fn choices(options: &[(&'static str, &'static str)]) -> Vec<Choice> {
    options
        .iter()
        .map(|(value, text)| Choice { value: Value::from(*value), text: (*text).into() })
        .collect()
}

fn optional_radio(name: &'static str, title: &str, options: &[(&'static str, &'static str)]) -> Element {
    Element::RadioGroup(ChoiceQuestion {
        name,
        title: title.into(),
        is_required: false,
        choices: choices(options),
    })
}

// A missing assignment entry yields an empty choice list, never an error. A picker
// with nothing to pick cannot be answered, so it is not required.
fn image_picker(name: &'static str, prompt: &Prompt, images: &ImageAssignment, multi_select: bool) -> Element {
    let choices = images.choices(name).to_vec();
    Element::ImagePicker(ImagePicker {
        name,
        title: prompt.title.into(),
        description: prompt.desc.into(),
        is_required: !choices.is_empty(),
        choices,
        image_fit: "cover",
        multi_select,
    })
}

fn image_display(name: &'static str, slot: &str, images: &ImageAssignment) -> Element {
    Element::Image(ImageDisplay {
        name,
        image_link: images.first_link(slot).map(str::to_string),
        image_fit: "cover",
        image_height: IMAGE_HEIGHT,
        image_width: "100%",
    })
}

fn pairwise(images: &ImageAssignment, questions: &[(&'static str, &Prompt)]) -> Vec<Element> {
    questions.iter().map(|(name, prompt)| image_picker(name, prompt, images, false)).collect()
}

fn demographics_page(t: &StringTable) -> Page {
    let elements = vec![
        optional_radio("community_type", t.community_type, &[
            ("high_dense", t.high_dense),
            ("high_open", t.high_open),
            ("mid_dense", t.mid_dense),
            ("mid_open", t.mid_open),
            ("low_dense", t.low_dense),
            ("low_open", t.low_open),
            ("mixed", t.mixed),
            ("uncertain", t.uncertain),
        ]),
        optional_radio("gender", t.gender, &[("male", t.male), ("female", t.female)]),
        optional_radio("age", t.age, &[
            ("under_18", t.under_18),
            ("18_24", t.age_18_to_24),
            ("25_30", t.age_25_to_30),
            ("31_40", t.age_31_to_40),
            ("41_50", t.age_41_to_50),
            ("51_60", t.age_51_to_60),
            ("over_61", t.over_61),
        ]),
        optional_radio("residence_duration", t.residence_duration, &[
            ("lt_1y", t.less_than_1_year),
            ("1_3y", t.one_to_three_years),
            ("3_5y", t.three_to_five_years),
            ("5_10y", t.five_to_ten_years),
            ("gt_10y", t.more_than_ten_years),
        ]),
        optional_radio("outdoor_activity", t.outdoor_activity, &[
            ("daily", t.daily),
            ("several_times_week", t.several_times_week),
            ("once_week", t.once_week),
            ("several_times_month", t.several_times_month),
            ("rarely", t.rarely),
            ("never", t.never),
        ]),
    ];
    page("demographics", &t.demographics, elements)
}

fn thermal_page(t: &StringTable, images: &ImageAssignment) -> Page {
    let scale = [
        t.very_uncomfortable,
        t.uncomfortable,
        t.neutral,
        t.comfortable,
        t.very_comfortable,
    ];
    let elements = vec![
        Element::Expression(Instruction {
            name: "thermal_instruction",
            title: t.thermal_instruction.title.into(),
            description: Some(t.thermal_instruction.desc.into()),
        }),
        image_picker("thermal_comfort", &t.thermal_comfort, images, false),
        image_picker("summer_walk", &t.summer_walk, images, true),
        image_display("comfort_image", "comfort_rating", images),
        Element::Rating(RatingQuestion {
            name: "comfort_level",
            title: t.comfort_level.into(),
            is_required: true,
            rate_values: scale
                .iter()
                .zip(1..)
                .map(|(text, value)| Choice { value: Value::from(value), text: (*text).into() })
                .collect(),
        }),
    ];
    page("thermal_affordance", &t.thermal_affordance, elements)
}

fn environmental_page(t: &StringTable, images: &ImageAssignment) -> Page {
    let mut elements = vec![Element::Expression(Instruction {
        name: "environmental_instruction",
        title: t.environmental_instruction.into(),
        description: None,
    })];
    elements.extend(pairwise(images, &[
        ("temperature_intensity", &t.temperature_intensity),
        ("sunshine_intensity", &t.sunshine_intensity),
        ("humidity_inference", &t.humidity_inference),
        ("wind_inference", &t.wind_inference),
        ("traffic_flow", &t.traffic_flow),
        ("greenery_rate", &t.greenery_rate),
        ("shading_area", &t.shading_area),
        ("material_comfort", &t.material_comfort),
    ]));
    elements.push(image_display("elements_image", "street_elements", images));
    elements.push(Element::Checkbox(ChoiceQuestion {
        name: "visible_elements",
        title: t.visible_elements.into(),
        is_required: true,
        choices: choices(&[
            ("trees", t.element_trees),
            ("street_furniture", t.element_furniture),
            ("bike_lanes", t.element_bike_lanes),
            ("crosswalks", t.element_crosswalks),
            ("public_art", t.element_public_art),
            ("commercial", t.element_commercial),
            ("residential", t.element_residential),
            ("parking", t.element_parking),
            ("transit", t.element_transit),
            ("outdoor_dining", t.element_outdoor_dining),
        ]),
    }));
    page("environmental_assessment", &t.environmental_assessment, elements)
}

fn design_quality_page(t: &StringTable, images: &ImageAssignment) -> Page {
    let elements = pairwise(images, &[
        ("imageability", &t.imageability),
        ("enclosure", &t.enclosure),
        ("human_scale", &t.human_scale),
        ("transparency", &t.transparency),
        ("complexity", &t.complexity),
    ]);
    page("design_quality", &t.design_quality, elements)
}

fn emotional_page(t: &StringTable, images: &ImageAssignment) -> Page {
    let elements = pairwise(images, &[
        ("safe_feeling", &t.safe_feeling),
        ("beautiful_feeling", &t.beautiful_feeling),
        ("lively_feeling", &t.lively_feeling),
        ("wealthy_feeling", &t.wealthy_feeling),
        ("boring_feeling", &t.boring_feeling),
        ("depressing_feeling", &t.depressing_feeling),
    ]);
    page("emotional_response", &t.emotional_response, elements)
}

fn ranking_page(t: &StringTable, images: &ImageAssignment) -> Page {
    let elements = vec![
        image_display("ranking_image", "feature_ranking", images),
        Element::Ranking(ChoiceQuestion {
            name: "thermal_comfort_factors",
            title: t.thermal_comfort_factors.into(),
            is_required: true,
            choices: choices(&[
                ("shading", t.shading),
                ("greenery", t.greenery),
                ("ventilation", t.ventilation),
                ("building_layout", t.building_layout),
                ("water_features", t.water_features),
                ("pavement_material", t.pavement_material),
                ("street_width", t.street_width),
            ]),
        }),
        Element::Comment(TextQuestion {
            name: "general_feedback",
            title: t.general_feedback.title.into(),
            description: Some(t.general_feedback.desc.into()),
            is_required: false,
            max_length: FEEDBACK_MAX_LENGTH,
        }),
    ];
    page("feature_ranking", &t.feature_ranking, elements)
}
