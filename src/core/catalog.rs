//! Static topic catalog and search filtering.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topic {
    pub name: &'static str,
    /// Font Awesome identifier; see [`icon_glyph`] for the terminal rendering.
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub name: &'static str,
    pub topics: &'static [Topic],
}

const fn topic(name: &'static str, icon: &'static str) -> Topic {
    Topic { name, icon }
}

pub static CATALOG: &[Category] = &[
    Category {
        name: "Basic Principles",
        topics: &[
            topic("Humors (Akhlat)", "fa-flask"),
            topic("Temperaments (Mizaj)", "fa-balance-scale"),
            topic("Faculties (Quwa)", "fa-brain"),
            topic("Organs (Aza)", "fa-heart"),
            topic("Spirits (Arwah)", "fa-wind"),
            topic("Functions (Af’al)", "fa-cogs"),
            topic("Causes of Disease (Asbab-e-Sitta Zarooriya)", "fa-bug"),
        ],
    },
    Category {
        name: "Diagnosis & Treatment",
        topics: &[
            topic("Pulse Examination (Nabz)", "fa-heartbeat"),
            topic("Urine Examination (Baul)", "fa-tint"),
            topic("Stool Examination (Baraz)", "fa-poop"),
            topic("Herbal Medicine (Advia Mufrada)", "fa-leaf"),
            topic("Compound Formulations (Advia Murakkaba)", "fa-pills"),
            topic("Regimental Therapy (Ilaj Bil Tadbeer)", "fa-spa"),
            topic("Dietotherapy (Ilaj Bil Ghiza)", "fa-apple-alt"),
            topic("Pharmacology (Ilmul Advia)", "fa-mortar-pestle"),
        ],
    },
    Category {
        name: "Specific Diseases & Remedies",
        topics: &[
            topic("Fever (Humma)", "fa-thermometer-full"),
            topic("Cough (Sual)", "fa-lungs"),
            topic("Headache (Suda)", "fa-head-side-mask"),
            topic("Digestive Disorders", "fa-stomach"),
            topic("Skin Diseases", "fa-hand-sparkles"),
            topic("Joint Pain (Waja-ul-Mafasil)", "fa-joint"),
            topic("Cardiac Ailments", "fa-heart-pulse"),
            topic("Respiratory Ailments", "fa-lungs"),
            topic("Urinary Disorders", "fa-kidneys"),
        ],
    },
];

/// Categories whose topics contain `query` (case-insensitive), in catalog
/// order. Empty categories are dropped; an empty query keeps everything.
pub fn filter_topics(query: &str) -> Vec<(&'static str, Vec<Topic>)> {
    let needle = query.to_lowercase();
    CATALOG
        .iter()
        .filter_map(|category| {
            let matches: Vec<Topic> = category
                .topics
                .iter()
                .filter(|topic| topic.name.to_lowercase().contains(&needle))
                .copied()
                .collect();
            (!matches.is_empty()).then_some((category.name, matches))
        })
        .collect()
}

pub fn find_topic(name: &str) -> Option<Topic> {
    CATALOG
        .iter()
        .flat_map(|category| category.topics.iter())
        .find(|topic| topic.name == name)
        .copied()
}

/// Terminal glyph for a Font Awesome icon identifier.
pub fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "fa-flask" | "fa-mortar-pestle" => "⚗",
        "fa-balance-scale" => "⚖",
        "fa-brain" => "✺",
        "fa-heart" | "fa-heart-pulse" | "fa-heartbeat" => "♥",
        "fa-wind" | "fa-lungs" => "≋",
        "fa-cogs" => "⚙",
        "fa-bug" => "✳",
        "fa-tint" => "◆",
        "fa-leaf" | "fa-spa" => "❦",
        "fa-pills" => "◉",
        "fa-apple-alt" => "●",
        "fa-thermometer-full" => "♨",
        "fa-head-side-mask" | "fa-stomach" | "fa-kidneys" | "fa-joint" => "✚",
        "fa-hand-sparkles" => "✧",
        _ => "•",
    }
}
