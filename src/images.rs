//! Street image catalog and per-session image assignment.
//!
//! An `ImageAssignment` is drawn once when a session starts and never changes after
//! that: language switches rebuild the survey text around the same images.

use std::collections::BTreeMap;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

/// One image in the catalog.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StreetImage {
    pub id: String,
    pub image_url: String,
}

/// Pool of images questions draw from.
#[derive(Clone, Debug, Default)]
pub struct ImageCatalog {
    images: Vec<StreetImage>,
}

impl ImageCatalog {
    pub fn new(images: Vec<StreetImage>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let images = images.into_iter().filter(|i| seen.insert(i.id.clone())).collect();
        Self { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[StreetImage] {
        &self.images
    }
}

/// How many images each image-bearing question shows, in survey order.
#[derive(Clone, Debug)]
pub struct ImagePlan {
    slots: Vec<(String, usize)>,
}

impl ImagePlan {
    #[cfg(test)]
    pub fn new<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        Self { slots: slots.into_iter().map(|(q, n)| (q.into(), n)).collect() }
    }

    pub fn slots(&self) -> &[(String, usize)] {
        &self.slots
    }
}

/// Pairwise comparisons show two streets.
pub const PAIRWISE: usize = 2;

/// Question ids of the pairwise comparison questions, in survey order.
pub const PAIRWISE_QUESTIONS: [&str; 20] = [
    "thermal_comfort",
    "temperature_intensity",
    "sunshine_intensity",
    "humidity_inference",
    "wind_inference",
    "traffic_flow",
    "greenery_rate",
    "shading_area",
    "material_comfort",
    "imageability",
    "enclosure",
    "human_scale",
    "transparency",
    "complexity",
    "safe_feeling",
    "beautiful_feeling",
    "lively_feeling",
    "wealthy_feeling",
    "boring_feeling",
    "depressing_feeling",
];

impl Default for ImagePlan {
    fn default() -> Self {
        let mut slots: Vec<(String, usize)> =
            PAIRWISE_QUESTIONS.iter().map(|q| (q.to_string(), PAIRWISE)).collect();
        slots.push(("summer_walk".into(), 4));
        slots.push(("comfort_rating".into(), 1));
        slots.push(("street_elements".into(), 1));
        slots.push(("feature_ranking".into(), 1));
        Self { slots }
    }
}

/// What the survey runtime displays for one image option.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageChoice {
    pub value: String,
    pub image_link: String,
}

impl From<&StreetImage> for ImageChoice {
    fn from(img: &StreetImage) -> Self {
        Self { value: img.id.clone(), image_link: img.image_url.clone() }
    }
}

/// Images shown per question for one session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageAssignment {
    seed: u64,
    by_question: BTreeMap<String, Vec<ImageChoice>>,
}

impl ImageAssignment {
    /// Draw images for every planned question. Within a question images are distinct;
    /// across questions they may repeat. The same seed, catalog and plan always give
    /// the same assignment.
    pub fn generate(catalog: &ImageCatalog, plan: &ImagePlan, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let by_question = plan
            .slots()
            .iter()
            .map(|(question, count)| {
                let picked = catalog
                    .images()
                    .choose_multiple(&mut rng, *count)
                    .map(ImageChoice::from)
                    .collect();
                (question.clone(), picked)
            })
            .collect();
        Self { seed, by_question }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Images for `question`; empty when the question has no entry.
    pub fn choices(&self, question: &str) -> &[ImageChoice] {
        self.by_question.get(question).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first_link(&self, question: &str) -> Option<&str> {
        self.choices(question).first().map(|c| c.image_link.as_str())
    }

    #[cfg(test)]
    pub fn contains(&self, question: &str) -> bool {
        self.by_question.contains_key(question)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.by_question.len()
    }

    /// Mapping persisted as `displayed_images`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.by_question).unwrap_or_default()
    }

    #[cfg(test)]
    pub fn without(mut self, question: &str) -> Self {
        self.by_question.remove(question);
        self
    }
}

#[cfg(test)]
pub(crate) fn test_catalog(n: usize) -> ImageCatalog {
    ImageCatalog::new(
        (1..=n)
            .map(|i| StreetImage { id: format!("street_{i:03}"), image_url: format!("/images/street_{i:03}.jpg") })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn same_seed_same_assignment() {
        let catalog = test_catalog(30);
        let plan = ImagePlan::default();
        let a = ImageAssignment::generate(&catalog, &plan, 42);
        let b = ImageAssignment::generate(&catalog, &plan, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), plan.slots().len());
    }

    #[test]
    fn images_within_a_question_are_distinct() {
        let catalog = test_catalog(6);
        let plan = ImagePlan::new([("four", 4), ("two", 2)]);
        for seed in 0..50 {
            let a = ImageAssignment::generate(&catalog, &plan, seed);
            let four: HashSet<_> = a.choices("four").iter().map(|c| &c.value).collect();
            assert_eq!(four.len(), 4);
            assert_eq!(a.choices("two").len(), 2);
        }
    }

    #[test]
    fn small_catalog_returns_what_it_has() {
        let catalog = test_catalog(3);
        let a = ImageAssignment::generate(&catalog, &ImagePlan::new([("many", 5)]), 7);
        assert_eq!(a.choices("many").len(), 3);

        let empty = ImageAssignment::generate(&ImageCatalog::default(), &ImagePlan::default(), 7);
        assert!(empty.choices("thermal_comfort").is_empty());
        assert!(empty.contains("thermal_comfort"));
    }

    #[test]
    fn unknown_question_has_no_choices() {
        let a = ImageAssignment::generate(&test_catalog(10), &ImagePlan::default(), 1);
        assert!(a.choices("not_a_question").is_empty());
        assert_eq!(a.first_link("not_a_question"), None);
    }

    #[test]
    fn catalog_drops_duplicate_ids() {
        let img = StreetImage { id: "a".into(), image_url: "/a.jpg".into() };
        let catalog = ImageCatalog::new(vec![img.clone(), img]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn persisted_mapping_uses_runtime_field_names() {
        let a = ImageAssignment::generate(&test_catalog(4), &ImagePlan::new([("q", 1)]), 3);
        let v = a.to_json();
        assert!(v["q"][0]["imageLink"].as_str().unwrap().starts_with("/images/street_"));
        assert!(v.get("seed").is_none());
    }
}
