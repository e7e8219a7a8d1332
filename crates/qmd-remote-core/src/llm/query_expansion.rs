//! Query expansion protocol
//!
//! Asks a generation backend for a hypothetical document plus lexical and semantic
//! rephrasings of a query, then parses the line-oriented answer:
//!
//! ```text
//! hyde: <passage>
//! lex: <keywords>
//! vec: <phrasing>
//! ```
//!
//! Expansion never fails. Without a generation endpoint, or when generation or
//! parsing fails, the literal query is passed through instead.

use super::{ExpandOptions, GenerateOptions, Llm, QueryType, Queryable};

/// Token budget for the expansion answer (analysis steps plus final lines)
const EXPANSION_MAX_TOKENS: u32 = 600;

/// Expand `query` using `llm`'s generate primitive
pub async fn expand_query<L: Llm + ?Sized>(
    llm: &L,
    query: &str,
    options: &ExpandOptions,
) -> Vec<Queryable> {
    if !llm.can_generate() {
        return fallback_queries(query, options.include_lexical);
    }

    let prompt = build_expansion_prompt(query, options);
    let generate_options = GenerateOptions {
        max_tokens: EXPANSION_MAX_TOKENS,
        temperature: 0.0,
    };

    let Some(result) = llm.generate(&prompt, &generate_options).await else {
        tracing::warn!("Query expansion generation failed, using literal query");
        return fallback_queries(query, options.include_lexical);
    };

    let queries = parse_expansion(&result.text, options.include_lexical);
    if queries.is_empty() {
        tracing::warn!("Query expansion produced no usable lines, using literal query");
        tracing::debug!("Raw expansion response: {}", result.text);
        return fallback_queries(query, options.include_lexical);
    }

    tracing::debug!("Expanded query into {} variants", queries.len());
    queries
}

/// Literal passthrough: `lex` first (when requested), then `vec`
pub fn fallback_queries(query: &str, include_lexical: bool) -> Vec<Queryable> {
    let mut queries = Vec::with_capacity(2);
    if include_lexical {
        queries.push(Queryable::lex(query));
    }
    queries.push(Queryable::vec(query));
    queries
}

/// Build the fixed-structure expansion prompt
pub fn build_expansion_prompt(query: &str, options: &ExpandOptions) -> String {
    let context_info = options
        .context
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| {
            format!(
                "\nBackground (lower priority than the query itself, use only as a hint): {}\n",
                c
            )
        })
        .unwrap_or_default();

    let (format_lines, lexical_rule) = if options.include_lexical {
        (
            "hyde: <one hypothetical document passage>\nlex: <keyword search terms>\nvec: <natural language search phrasing>",
            "Write 1-3 lex: lines and 1-3 vec: lines.",
        )
    } else {
        (
            "hyde: <one hypothetical document passage>\nvec: <natural language search phrasing>",
            "Do not write any lex: lines. Write 1-3 vec: lines.",
        )
    };

    format!(
        r#"You are expanding a search query to improve document retrieval.

Query: "{query}"
{context_info}
Work through these steps:
1. Analyze what the user is looking for.
2. Write one short hypothetical document passage that would perfectly answer the query.
3. Write 2-3 alternative phrasings of the query.
4. Give the final answer.

Final answer format, each entry on its own line, in this order:
{format_lines}

Rules for the final answer:
- At most one hyde: line.
- {lexical_rule}
- No other text after the final answer lines.
"#
    )
}

/// Parse generated text into typed queries, preserving line order
///
/// Lines without a colon or with an unknown tag are dropped. When lexical
/// variants are not wanted, `lex` entries are filtered out even if the
/// backend produced them.
pub fn parse_expansion(text: &str, include_lexical: bool) -> Vec<Queryable> {
    text.lines()
        .filter_map(parse_line)
        .filter(|q| include_lexical || q.kind != QueryType::Lex)
        .collect()
}

fn parse_line(line: &str) -> Option<Queryable> {
    let (tag, rest) = line.split_once(':')?;
    let kind = QueryType::from_tag(tag.trim())?;
    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    Some(Queryable::new(kind, text))
}
