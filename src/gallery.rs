//! Reference models hosted elsewhere, listed in the gallery view.

const MODEL_SITE: &str = "https://sketchfab.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    pub title: &'static str,
    pub model_name: &'static str,
    pub model_id: &'static str,
    pub model_slug: &'static str,
    pub author_name: &'static str,
    pub author_handle: &'static str,
}

impl ModelEntry {
    pub fn model_url(&self) -> String {
        format!("{MODEL_SITE}/3d-models/{}-{}", self.model_slug, self.model_id)
    }

    pub fn author_url(&self) -> String {
        format!("{MODEL_SITE}/{}", self.author_handle)
    }

    /// One line of credit, "<model> by <author>".
    pub fn credit(&self) -> String {
        format!("{} by {}", self.model_name, self.author_name)
    }
}

pub const MODELS: [ModelEntry; 3] = [
    ModelEntry {
        title: "Human Leg (Muscular)",
        model_name: "The Podiatrist's Leg",
        model_id: "2ff28ae5d41b42b1ab6a019f1f3b1586",
        model_slug: "the-podiatrists-leg",
        author_name: "SadLittleKing",
        author_handle: "SadLittleKing",
    },
    ModelEntry {
        title: "Human Leg (Skeletal)",
        model_name: "Leg Skeleton | Leg Bones | Human Leg",
        model_id: "fc18a6eb429c40e8ab1c1c28d7101b9d",
        model_slug: "leg-skeleton-leg-bones-human-leg",
        author_name: "omkarb",
        author_handle: "omkarbonline",
    },
    ModelEntry {
        title: "Trans-tibial Prosthesis",
        model_name: "Ugani - Transtibial prosthetic model",
        model_id: "cbd217398f2e41b3b01451ad0536d0a6",
        model_slug: "ugani-transtibial-prosthetic-model",
        author_name: "uganiprosthetics",
        author_handle: "uganiprosthetics",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_are_built_from_ids() {
        let prosthesis = &MODELS[2];
        assert_eq!(
            prosthesis.model_url(),
            "https://sketchfab.com/3d-models/ugani-transtibial-prosthetic-model-cbd217398f2e41b3b01451ad0536d0a6"
        );
        assert_eq!(MODELS[1].author_url(), "https://sketchfab.com/omkarbonline");
        assert_eq!(MODELS[0].credit(), "The Podiatrist's Leg by SadLittleKing");
    }
}
