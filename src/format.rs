//! Pretty printer for DDL statements.
//!
//! Every statement starts on a fresh line indented by four spaces. `create
//! table` bodies put one column per line; `alter table` statements break
//! before each clause keyword.

const CREATE_TABLE_DELIMITERS: &str = "(,)'[]\"";
const ALTER_TABLE_DELIMITERS: &str = " (,)'[]\"";

/// Format one unterminated DDL statement
pub fn format_statement(sql: &str) -> String {
    let lower = sql.trim_start().to_lowercase();
    if lower.starts_with("create table") {
        format_create_table(sql)
    } else if lower.starts_with("alter table") {
        format_alter_table(sql)
    } else {
        format!("\n    {}", sql)
    }
}

/// Join formatted statements into a script, each terminated by `;` and a newline
pub fn format_script<I, S>(statements: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut script = String::new();
    for statement in statements {
        script.push_str(&format_statement(statement.as_ref()));
        script.push_str(";\n");
    }
    script
}

fn format_create_table(sql: &str) -> String {
    let mut result = String::with_capacity(sql.len() + 60);
    result.push_str("\n    ");

    let mut depth = 0i32;
    let mut quoted = false;
    for token in tokenize(sql, CREATE_TABLE_DELIMITERS) {
        if is_quote(token) {
            quoted = !quoted;
            result.push_str(token);
        } else if quoted {
            result.push_str(token);
        } else {
            if token == ")" {
                depth -= 1;
                if depth == 0 {
                    result.push_str("\n    ");
                }
            }
            result.push_str(token);
            if token == "," && depth == 1 {
                // the next token keeps its leading space
                result.push_str("\n       ");
            }
            if token == "(" {
                depth += 1;
                if depth == 1 {
                    result.push_str("\n        ");
                }
            }
        }
    }
    result
}

fn format_alter_table(sql: &str) -> String {
    let mut result = String::with_capacity(sql.len() + 60);
    result.push_str("\n    ");

    let mut quoted = false;
    for token in tokenize(sql, ALTER_TABLE_DELIMITERS) {
        if is_quote(token) {
            quoted = !quoted;
        } else if !quoted && is_break(token) {
            result.push_str("\n        ");
        }
        result.push_str(token);
    }
    result
}

fn is_quote(token: &str) -> bool {
    matches!(token, "\"" | "`" | "]" | "[" | "'")
}

fn is_break(token: &str) -> bool {
    matches!(token, "drop" | "add" | "references" | "foreign" | "on")
}

/// Split `input` at every delimiter character, keeping each delimiter as its own token
fn tokenize<'a>(input: &'a str, delimiters: &str) -> Vec<&'a str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (idx, ch) in input.char_indices() {
        if delimiters.contains(ch) {
            if start < idx {
                tokens.push(&input[start..idx]);
            }
            let end = idx + ch.len_utf8();
            tokens.push(&input[idx..end]);
            start = end;
        }
    }
    if start < input.len() {
        tokens.push(&input[start..]);
    }
    tokens
}
