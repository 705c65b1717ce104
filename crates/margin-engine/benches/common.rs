// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_notes(sections: usize, depth: usize) -> String {
    let mut content = String::new();

    for section in 0..sections {
        content.push_str(&format!("# Section {}\n\n", section));
        content.push_str("Opening paragraph for the section.\n\n");
        content.push_str(&generate_nested_headings(depth, 2));
    }

    content
}

#[allow(dead_code)]
fn generate_nested_headings(remaining_depth: usize, current_level: usize) -> String {
    if remaining_depth == 0 || current_level > 6 {
        return String::new();
    }

    let mut content = String::new();
    let prefix = "#".repeat(current_level);

    for i in 0..2 {
        content.push_str(&format!(
            "{} Topic {} at level {}\n\n",
            prefix, i, current_level
        ));
        content.push_str("Some paragraph content with deep learning terms in it.\n\n");
        content.push_str(&generate_nested_headings(
            remaining_depth - 1,
            current_level + 1,
        ));
    }

    content
}

#[allow(dead_code)]
pub fn generate_prose(words: usize) -> String {
    let vocabulary = ["the", "network", "model", "trains", "on", "data", "quickly"];
    let mut content = String::new();
    for i in 0..words {
        content.push_str(vocabulary[i % vocabulary.len()]);
        content.push(' ');
    }
    content
}
