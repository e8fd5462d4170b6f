//! Voice catalogs.
//!
//! Two kinds of voices are in play:
//!
//! - **Prebuilt voices** of the cloud speech model, selected by id
//!   (`"Algenib"`, `"Rigel"`, ...).
//! - **Platform voices** reported by the host's speech-synthesis facility.
//!   Their inventory is only known at runtime, so [`VoiceTable`] resolves a
//!   language tag against whatever list the host provides using a fixed
//!   fallback chain:
//!
//! | Step | Rule | Request `en-GB` matches |
//! |---|---|---|
//! | [`MatchKind::Exact`] | same tag | `en-GB` |
//! | [`MatchKind::Prefix`] | voice tag extends the request | (request `en` → `en-US`) |
//! | [`MatchKind::BaseLanguage`] | same primary language | `en-US`, `en` |
//! | [`MatchKind::PlatformDefault`] | the host's default voice | anything |
//!
//! Tags are compared case-insensitively with `_` treated as `-`.

use serde::{Deserialize, Serialize};

/// Voice used when a speech request names none.
pub const DEFAULT_VOICE: &str = "Algenib";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Female,
    Male,
}

/// A prebuilt voice of the cloud speech model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrebuiltVoice {
    pub id: &'static str,
    pub name: &'static str,
    pub gender: Gender,
    pub description: &'static str,
}

pub const PREBUILT_VOICES: &[PrebuiltVoice] = &[
    PrebuiltVoice {
        id: "Algenib",
        name: "Algenib",
        gender: Gender::Female,
        description: "Clear and professional",
    },
    PrebuiltVoice {
        id: "Antares",
        name: "Antares",
        gender: Gender::Male,
        description: "Deep and resonant",
    },
    PrebuiltVoice {
        id: "Arcturus",
        name: "Arcturus",
        gender: Gender::Male,
        description: "Warm and friendly",
    },
    PrebuiltVoice {
        id: "Capella",
        name: "Capella",
        gender: Gender::Female,
        description: "Bright and energetic",
    },
    PrebuiltVoice {
        id: "Deneb",
        name: "Deneb",
        gender: Gender::Female,
        description: "Calm and soothing",
    },
    PrebuiltVoice {
        id: "Rigel",
        name: "Rigel",
        gender: Gender::Male,
        description: "Authoritative and crisp",
    },
];

/// Look up a prebuilt voice by id (case-insensitive).
pub fn find_prebuilt(id: &str) -> Option<&'static PrebuiltVoice> {
    PREBUILT_VOICES
        .iter()
        .find(|voice| voice.id.eq_ignore_ascii_case(id))
}

/// A translation target language and the tag used to pick a platform voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub name: &'static str,
    pub tag: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language {
        name: "English",
        tag: "en-US",
    },
    Language {
        name: "Spanish",
        tag: "es-ES",
    },
    Language {
        name: "French",
        tag: "fr-FR",
    },
    Language {
        name: "German",
        tag: "de-DE",
    },
    Language {
        name: "Italian",
        tag: "it-IT",
    },
    Language {
        name: "Portuguese",
        tag: "pt-BR",
    },
    Language {
        name: "Japanese",
        tag: "ja-JP",
    },
    Language {
        name: "Korean",
        tag: "ko-KR",
    },
    Language {
        name: "Chinese",
        tag: "zh-CN",
    },
    Language {
        name: "Hindi",
        tag: "hi-IN",
    },
    Language {
        name: "Arabic",
        tag: "ar-SA",
    },
    Language {
        name: "Russian",
        tag: "ru-RU",
    },
];

/// Look up a target language by its display name (case-insensitive).
pub fn language_by_name(name: &str) -> Option<&'static Language> {
    let name = name.trim();
    LANGUAGES
        .iter()
        .find(|language| language.name.eq_ignore_ascii_case(name))
}

/// A voice reported by the platform speech-synthesis facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformVoice {
    pub name: String,
    pub lang: String,
    #[serde(default)]
    pub is_default: bool,
}

impl PlatformVoice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            is_default: false,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Which step of the fallback chain produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    Exact,
    Prefix,
    BaseLanguage,
    PlatformDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceMatch<'a> {
    pub voice: &'a PlatformVoice,
    pub kind: MatchKind,
}

/// Platform voices indexed for language-tag lookup.
#[derive(Debug, Clone, Default)]
pub struct VoiceTable {
    voices: Vec<PlatformVoice>,
    /// Normalized tags, parallel to `voices`.
    tags: Vec<String>,
}

impl VoiceTable {
    pub fn new(voices: Vec<PlatformVoice>) -> Self {
        let tags = voices.iter().map(|voice| normalize_tag(&voice.lang)).collect();
        log::debug!("Indexed {} platform voices", voices.len());
        Self { voices, tags }
    }

    /// Replace the inventory, e.g. when the platform reports its voice list late.
    pub fn refresh(&mut self, voices: Vec<PlatformVoice>) {
        *self = Self::new(voices);
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn voices(&self) -> &[PlatformVoice] {
        &self.voices
    }

    /// Resolve `tag` through the fallback chain.
    ///
    /// Returns `None` only when the table is empty.
    pub fn resolve(&self, tag: &str) -> Option<VoiceMatch<'_>> {
        let wanted = normalize_tag(tag);
        let base = base_language(&wanted);
        let prefix = format!("{wanted}-");

        let found = self
            .position(|t| t == wanted)
            .map(|i| (i, MatchKind::Exact))
            .or_else(|| {
                self.position(|t| t.starts_with(&prefix))
                    .map(|i| (i, MatchKind::Prefix))
            })
            .or_else(|| {
                self.position(|t| !base.is_empty() && base_language(t) == base)
                    .map(|i| (i, MatchKind::BaseLanguage))
            })
            .or_else(|| {
                let default = self.voices.iter().position(|v| v.is_default);
                default
                    .or(if self.voices.is_empty() { None } else { Some(0) })
                    .map(|i| (i, MatchKind::PlatformDefault))
            });

        let (index, kind) = found?;
        if kind != MatchKind::Exact {
            log::debug!(
                "No exact platform voice for {tag:?}; using {:?} via {kind:?}",
                self.voices[index].name
            );
        }
        Some(VoiceMatch {
            voice: &self.voices[index],
            kind,
        })
    }

    fn position(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.tags.iter().position(|tag| pred(tag))
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}

fn base_language(tag: &str) -> &str {
    tag.split('-').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> VoiceTable {
        VoiceTable::new(vec![
            PlatformVoice::new("Samantha", "en-US").as_default(),
            PlatformVoice::new("Daniel", "en_GB"),
            PlatformVoice::new("Monica", "es-ES"),
            PlatformVoice::new("Paulina", "es-MX"),
            PlatformVoice::new("Thomas", "fr"),
        ])
    }

    #[test]
    fn exact_tag_wins_regardless_of_case_and_separator() {
        let table = inventory();
        let hit = table.resolve("EN-gb").unwrap();
        assert_eq!(hit.voice.name, "Daniel");
        assert_eq!(hit.kind, MatchKind::Exact);

        let hit = table.resolve("es_MX").unwrap();
        assert_eq!(hit.voice.name, "Paulina");
        assert_eq!(hit.kind, MatchKind::Exact);
    }

    #[test]
    fn bare_language_matches_first_regional_voice() {
        let table = inventory();
        let hit = table.resolve("es").unwrap();
        assert_eq!(hit.voice.name, "Monica");
        assert_eq!(hit.kind, MatchKind::Prefix);
    }

    #[test]
    fn regional_request_falls_back_to_base_language() {
        let table = inventory();
        let hit = table.resolve("fr-CA").unwrap();
        assert_eq!(hit.voice.name, "Thomas");
        assert_eq!(hit.kind, MatchKind::BaseLanguage);

        let hit = table.resolve("es-AR").unwrap();
        assert_eq!(hit.voice.name, "Monica");
        assert_eq!(hit.kind, MatchKind::BaseLanguage);
    }

    #[test]
    fn unknown_language_uses_platform_default() {
        let table = inventory();
        let hit = table.resolve("ja-JP").unwrap();
        assert_eq!(hit.voice.name, "Samantha");
        assert_eq!(hit.kind, MatchKind::PlatformDefault);
    }

    #[test]
    fn first_voice_stands_in_when_no_default_is_flagged() {
        let table = VoiceTable::new(vec![
            PlatformVoice::new("Anna", "de-DE"),
            PlatformVoice::new("Kyoko", "ja-JP"),
        ]);
        let hit = table.resolve("ko").unwrap();
        assert_eq!(hit.voice.name, "Anna");
        assert_eq!(hit.kind, MatchKind::PlatformDefault);
    }

    #[test]
    fn empty_table_resolves_nothing() {
        let mut table = VoiceTable::default();
        assert!(table.resolve("en").is_none());

        table.refresh(vec![PlatformVoice::new("Alex", "en-US")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("en").unwrap().voice.name, "Alex");
    }

    #[test]
    fn prebuilt_catalog_contains_default_voice() {
        let voice = find_prebuilt(DEFAULT_VOICE).unwrap();
        assert_eq!(voice.gender, Gender::Female);
        assert_eq!(find_prebuilt("rigel").unwrap().description, "Authoritative and crisp");
        assert!(find_prebuilt("Sirius").is_none());
        assert_eq!(PREBUILT_VOICES.len(), 6);
    }

    #[test]
    fn language_names_map_to_tags() {
        assert_eq!(language_by_name(" spanish ").unwrap().tag, "es-ES");
        assert!(language_by_name("Klingon").is_none());
    }
}
