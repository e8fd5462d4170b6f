use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateInput {
    pub text: String,
    /// Display name of the target language, e.g. `"Spanish"`.
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateOutput {
    pub translated_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectGrammarInput {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectGrammarOutput {
    pub corrected_text: String,
}

/// The remote translation model.
pub trait Translator {
    fn translate(
        &mut self,
        input: &TranslateInput,
    ) -> Result<TranslateOutput, Box<dyn std::error::Error>>;
}

/// The remote grammar and spelling correction model.
pub trait GrammarCorrector {
    fn correct_grammar(
        &mut self,
        input: &CorrectGrammarInput,
    ) -> Result<CorrectGrammarOutput, Box<dyn std::error::Error>>;
}
