//! Prompt templates

/// Question answering over retrieved context
pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an AI assistant. Given the following context, answer the question to the best of your ability.\nContext: {}\nQuestion: {}\nAnswer:",
        context, question
    )
}

/// First step of a refine summary
pub fn summary_prompt(text: &str) -> String {
    format!("Write a concise summary of the following:\n\n\"{}\"\n\nCONCISE SUMMARY:", text)
}

/// Later steps of a refine summary
pub fn refine_prompt(existing: &str, text: &str) -> String {
    format!(
        "Your job is to produce a final summary.\n\
         We have provided an existing summary up to a certain point: {}\n\
         We have the opportunity to refine the existing summary (only if needed) with some more context below.\n\
         ------------\n\
         {}\n\
         ------------\n\
         Given the new context, refine the original summary. If the context isn't useful, return the original summary.",
        existing, text
    )
}

/// Map step of key-point extraction
pub fn key_points_prompt(text: &str) -> String {
    format!(
        "The following is a part of a web page:\n{}\nBased on this text, list its key points as a bulleted list.\nKEY POINTS:",
        text
    )
}

/// Reduce step merging the per-part key points
pub fn merge_key_points_prompt(lists: &[String]) -> String {
    format!(
        "The following are key points extracted from consecutive parts of one web page:\n{}\nMerge them into a single bulleted list of the most important key points, removing duplicates.\nKEY POINTS:",
        lists.join("\n\n")
    )
}
