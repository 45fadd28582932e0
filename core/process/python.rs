use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, Tree};

static PYTHON: Lazy<Language> = Lazy::new(|| tree_sitter_python::LANGUAGE.into());

static IMPORT_QUERY: Lazy<Query> = Lazy::new(|| {
    Query::new(
        &PYTHON,
        r#"
        (import_statement) @import
        (import_from_statement) @import
        (future_import_statement) @import
        "#,
    )
    .expect("static Python import query must compile")
});

fn parse(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&PYTHON)
        .map_err(|e| AppError::SourceParse(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AppError::SourceParse("Python parser produced no tree".to_string()))?;
    if tree.root_node().has_error() {
        return Err(AppError::SourceParse(
            "Python source contains syntax errors".to_string(),
        ));
    }
    Ok(tree)
}

/// Reduces a Python source to its declaration headers: function and class
/// signatures (decorators and multi-line parameter lists intact) plus any
/// docstring, with implementation bodies elided behind a `...` marker.
///
/// Signature spans come from the syntax tree, sliced out of the original
/// text, so nesting and line breaks survive unchanged.
pub fn extract_interface(source: &str) -> Result<String> {
    let tree = parse(source)?;
    let mut out = String::new();
    emit_scope(tree.root_node(), source, &mut out);
    Ok(out)
}

/// Collects every import declaration in source order, one per line,
/// deduplicated within the file.
pub fn extract_imports(source: &str) -> Result<Vec<String>> {
    let tree = parse(source)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&IMPORT_QUERY, tree.root_node(), source.as_bytes());

    let mut imports = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let text = &source[capture.node.byte_range()];
            // Parenthesized from-imports can span lines; flatten them.
            let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !imports.contains(&line) {
                imports.push(line);
            }
        }
    }
    Ok(imports)
}

fn emit_scope(scope: Node, source: &str, out: &mut String) {
    let mut cursor = scope.walk();
    for child in scope.named_children(&mut cursor) {
        match child.kind() {
            "function_definition" | "class_definition" => {
                emit_definition(child, child, source, out);
            }
            "decorated_definition" => {
                if let Some(def) = child.child_by_field_name("definition") {
                    emit_definition(child, def, source, out);
                }
            }
            _ => {}
        }
    }
}

// `outer` includes any decorators; `def` is the definition node itself.
fn emit_definition(outer: Node, def: Node, source: &str, out: &mut String) {
    let Some(body) = def.child_by_field_name("body") else {
        return;
    };
    let def_indent = line_indent_at(source, outer.start_byte());
    let header = source[outer.start_byte()..body.start_byte()].trim_end();
    let inner_indent = format!("{def_indent}    ");

    let docstring = body
        .named_child(0)
        .filter(|stmt| stmt.kind() == "expression_statement")
        .and_then(|stmt| stmt.named_child(0))
        .filter(|expr| expr.kind() == "string");
    let has_members = def.kind() == "class_definition" && has_definitions(body);

    if docstring.is_none() && !has_members {
        out.push_str(def_indent);
        out.push_str(header);
        out.push_str(" ...\n");
        return;
    }

    out.push_str(def_indent);
    out.push_str(header);
    out.push('\n');
    if let Some(doc) = docstring {
        out.push_str(&inner_indent);
        out.push_str(&source[doc.byte_range()]);
        out.push('\n');
    }
    if has_members {
        emit_scope(body, source, out);
    } else {
        out.push_str(&inner_indent);
        out.push_str("...\n");
    }
}

fn has_definitions(body: Node) -> bool {
    let mut cursor = body.walk();
    body.named_children(&mut cursor).any(|child| {
        matches!(
            child.kind(),
            "function_definition" | "class_definition" | "decorated_definition"
        )
    })
}

fn line_indent_at(source: &str, byte: usize) -> &str {
    let line_start = source[..byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
    &source[line_start..byte]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_line_function_keeps_signature_only() {
        let interface = extract_interface("def f(): return 1\n").unwrap();
        assert_eq!(interface, "def f(): ...\n");
    }

    #[test]
    fn multi_line_signature_survives_intact() {
        let source = "def add(\n    a: int,\n    b: int,\n) -> int:\n    return a + b\n";
        let interface = extract_interface(source).unwrap();
        assert_eq!(interface, "def add(\n    a: int,\n    b: int,\n) -> int: ...\n");
    }

    #[test]
    fn docstring_is_kept_with_the_signature() {
        let source = "def g():\n    \"\"\"Adds nothing.\"\"\"\n    return 2\n";
        let interface = extract_interface(source).unwrap();
        assert_eq!(interface, "def g():\n    \"\"\"Adds nothing.\"\"\"\n    ...\n");
    }

    #[test]
    fn class_members_are_reduced_recursively() {
        let source = concat!(
            "class A:\n",
            "    \"\"\"A thing.\"\"\"\n",
            "    def m(self):\n",
            "        return 1\n",
            "\n",
            "    def n(self, x):\n",
            "        return x\n",
        );
        let interface = extract_interface(source).unwrap();
        assert_eq!(
            interface,
            concat!(
                "class A:\n",
                "    \"\"\"A thing.\"\"\"\n",
                "    def m(self): ...\n",
                "    def n(self, x): ...\n",
            )
        );
    }

    #[test]
    fn decorators_belong_to_the_header() {
        let source = "@app.route(\"/\")\ndef handler():\n    return render()\n";
        let interface = extract_interface(source).unwrap();
        assert_eq!(interface, "@app.route(\"/\")\ndef handler(): ...\n");
    }

    #[test]
    fn bodies_never_leak_into_the_interface() {
        let source = concat!(
            "class Store:\n",
            "    def put(self, key, value):\n",
            "        self.data[key] = value\n",
            "        return True\n",
            "\n",
            "def top():\n",
            "    secret = 42\n",
            "    return secret\n",
        );
        let interface = extract_interface(source).unwrap();
        assert!(!interface.contains("self.data"));
        assert!(!interface.contains("secret"));
        assert!(!interface.contains("return"));
    }

    #[test]
    fn module_statements_other_than_definitions_are_dropped() {
        let source = "import os\n\nX = 1\n\ndef f():\n    pass\n";
        let interface = extract_interface(source).unwrap();
        assert_eq!(interface, "def f(): ...\n");
    }

    #[test]
    fn interface_lines_follow_source_order() {
        let source = concat!(
            "import os\n",
            "\n",
            "@cached\n",
            "def first(a,\n",
            "          b):\n",
            "    \"\"\"First.\"\"\"\n",
            "    return a + b\n",
            "\n",
            "class Second:\n",
            "    def method(self):\n",
            "        return None\n",
        );
        let interface = extract_interface(source).unwrap();
        let source_lines: Vec<&str> = source.lines().collect();
        let mut cursor = 0usize;
        for line in interface.lines() {
            let candidate = line.strip_suffix(" ...").unwrap_or(line);
            if candidate.trim() == "..." {
                continue;
            }
            let pos = source_lines[cursor..]
                .iter()
                .position(|src| src.starts_with(candidate))
                .unwrap_or_else(|| panic!("line not found in source order: {candidate:?}"));
            cursor += pos + 1;
        }
    }

    #[test]
    fn imports_are_collected_in_source_order_and_deduplicated() {
        let source = concat!(
            "import os\n",
            "import sys\n",
            "from typing import List\n",
            "import os\n",
            "\n",
            "def f():\n",
            "    import json\n",
            "    return json\n",
        );
        let imports = extract_imports(source).unwrap();
        assert_eq!(
            imports,
            vec![
                "import os",
                "import sys",
                "from typing import List",
                "import json"
            ]
        );
    }

    #[test]
    fn parenthesized_import_is_flattened_to_one_line() {
        let source = "from typing import (\n    List,\n    Optional,\n)\n";
        let imports = extract_imports(source).unwrap();
        assert_eq!(imports, vec!["from typing import ( List, Optional, )"]);
    }

    #[test]
    fn file_without_imports_contributes_nothing() {
        let imports = extract_imports("def f():\n    pass\n").unwrap();
        assert!(imports.is_empty());
    }

    #[test]
    fn malformed_source_is_a_parse_error() {
        assert!(extract_interface("def broken(:\n").is_err());
        assert!(extract_imports("def broken(:\n").is_err());
    }
}
