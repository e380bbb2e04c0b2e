use super::message::Message;

pub const SOURCE_ACKNOWLEDGEMENT: &str =
    "I have read the page content. What would you like to know about it?";

/// The three messages every conversation starts with: instructions, the
/// extracted page text, and a fixed acknowledgement.
pub fn seed_messages(source_url: &str, source_content: &str) -> Vec<Message> {
    vec![
        Message::system(system_prompt(source_url)),
        Message::user(content_prompt(source_content)),
        Message::assistant(SOURCE_ACKNOWLEDGEMENT),
    ]
}

fn system_prompt(source_url: &str) -> String {
    format!(
        "You are a web page reading assistant. You answer questions using only the content \
         fetched from {source_url}. Keep answers concise and accurate, base them directly on \
         the provided page content, and say so plainly when the page does not contain the answer."
    )
}

fn content_prompt(source_content: &str) -> String {
    format!("Here is the content extracted from the web page:\n\n{source_content}")
}
