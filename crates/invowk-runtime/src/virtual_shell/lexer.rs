//! Tokenizes a virtual-shell script into simple commands. Deliberately
//! modest (§4.5 "Virtual shell boundary"): `;` and newlines separate
//! statements, whitespace separates words, and single/double quotes
//! group a word containing spaces. No pipes, redirection, control
//! flow, or globbing.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub words: Vec<String>,
}

pub fn lex(script: &str) -> Vec<Statement> {
    script
        .split(['\n', ';'])
        .map(split_words)
        .filter(|s| !s.words.is_empty())
        .collect()
}

fn split_words(line: &str) -> Statement {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => {
                quote = None;
            }
            Some(_) => current.push(c),
            None => match c {
                '#' if !in_word => break,
                '\'' | '"' => {
                    quote = Some(c);
                    in_word = true;
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }
    if in_word || !current.is_empty() {
        words.push(current);
    }

    Statement { words }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolons_and_newlines() {
        let statements = lex("echo a; echo b\necho c");
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[1].words, vec!["echo", "b"]);
    }

    #[test]
    fn quoted_words_keep_internal_spaces() {
        let statements = lex(r#"echo "hello world""#);
        assert_eq!(statements[0].words, vec!["echo", "hello world"]);
    }

    #[test]
    fn comments_are_stripped() {
        let statements = lex("echo a # trailing comment\necho b");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].words, vec!["echo", "a"]);
    }

    #[test]
    fn blank_lines_produce_no_statement() {
        let statements = lex("\n\necho a\n\n");
        assert_eq!(statements.len(), 1);
    }
}
