// Résumé generation: themes, prompt, model call, response recovery, fit scoring.
// All model calls go through the ModelCapability trait in llm_client.

pub mod fit_scoring;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod recovery;
pub mod themes;
