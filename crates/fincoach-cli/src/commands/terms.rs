//! Knowledge base command implementations

use anyhow::Result;
use fincoach_core::knowledge::{FinancialTerm, KnowledgeBase, QuestionKind};

fn require_term<'a>(kb: &'a KnowledgeBase, name: &str) -> Result<&'a FinancialTerm> {
    kb.lookup(name).ok_or_else(|| {
        anyhow::anyhow!(
            "Term '{}' not found. Try 'fincoach terms search {}'",
            name,
            name
        )
    })
}

pub fn cmd_terms_show(kb: &KnowledgeBase, name: &str) -> Result<()> {
    let term = require_term(kb, name)?;

    println!();
    println!("📖 {} ({})", term.name, term.category);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {}", term.definition);
    if !term.aliases.is_empty() {
        println!("   Also known as: {}", term.aliases.join(", "));
    }
    if let Some(formula) = &term.formula {
        println!("   Formula: {}", formula);
    }
    if let Some(comparison) = &term.comparison {
        println!("   Compare: {}", comparison);
    }

    if !term.student_context.is_empty() {
        println!();
        println!("🎓 For students");
        println!("   {}", term.student_context);
    }

    if !term.how_to.is_empty() {
        println!();
        println!("🛠️  How to");
        for (i, step) in term.how_to.iter().enumerate() {
            println!("   {}. {}", i + 1, step);
        }
    }

    if !term.student_advice.is_empty() {
        println!();
        println!("💡 {}", term.student_advice);
    }

    let related = kb.related_terms(&term.name);
    if !related.is_empty() {
        let names: Vec<&str> = related.iter().map(|t| t.name.as_str()).collect();
        println!();
        println!("   See also: {}", names.join(", "));
    }

    Ok(())
}

pub fn cmd_terms_search(kb: &KnowledgeBase, keyword: &str) -> Result<()> {
    let matches = kb.search(keyword);

    if matches.is_empty() {
        println!("No terms match '{}'.", keyword);
        return Ok(());
    }

    println!();
    println!("🔍 Terms matching '{}'", keyword);
    for term in matches {
        println!("   {:<20} {}", term.name, term.category);
    }
    Ok(())
}

/// With no name, list the categories; otherwise the terms in that category
pub fn cmd_terms_category(kb: &KnowledgeBase, name: Option<&str>) -> Result<()> {
    let Some(name) = name else {
        println!();
        println!("📚 Categories");
        for category in kb.categories() {
            println!("   {} ({} terms)", category, kb.by_category(category).len());
        }
        return Ok(());
    };

    let terms = kb.by_category(name);
    if terms.is_empty() {
        anyhow::bail!(
            "Unknown category '{}'. Available: {}",
            name,
            kb.categories().join(", ")
        );
    }

    println!();
    println!("📚 {}", name);
    for term in terms {
        println!("   {}", term.name);
    }
    Ok(())
}

pub fn cmd_terms_related(kb: &KnowledgeBase, name: &str) -> Result<()> {
    let term = require_term(kb, name)?;
    let related = kb.related_terms(&term.name);

    if related.is_empty() {
        println!("No related terms for {}.", term.name);
        return Ok(());
    }

    println!();
    println!("🔗 Related to {}", term.name);
    for other in related {
        println!("   {:<20} {}", other.name, other.category);
    }
    Ok(())
}

pub fn cmd_terms_ask(kb: &KnowledgeBase, question: &str) -> Result<()> {
    let answer = kb.ask(question);

    let Some(term) = answer.best() else {
        println!(
            "I don't have information about '{}'. Try 'fincoach terms search <keyword>'.",
            answer.subject
        );
        return Ok(());
    };

    println!();
    match answer.kind {
        QuestionKind::Definition => {
            println!("📖 {}", term.name);
            println!("   {}", term.definition);
            if !term.student_context.is_empty() {
                println!("   {}", term.student_context);
            }
        }
        QuestionKind::Comparison => {
            println!("⚖️  {}", answer.subject);
            for side in &answer.terms {
                println!("   {}: {}", side.name, side.definition);
            }
            if let Some(comparison) = answer.terms.iter().find_map(|t| t.comparison.as_ref()) {
                println!();
                println!("   {}", comparison);
            }
        }
        QuestionKind::HowTo => {
            println!("🛠️  How to {} ({})", answer.subject, term.name);
            for (i, step) in term.how_to.iter().enumerate() {
                println!("   {}. {}", i + 1, step);
            }
            if !term.student_advice.is_empty() {
                println!();
                println!("💡 {}", term.student_advice);
            }
        }
        QuestionKind::Recommendation => {
            println!("💡 {} ({})", answer.subject, term.name);
            let advice = if term.student_advice.is_empty() {
                &term.definition
            } else {
                &term.student_advice
            };
            println!("   {}", advice);
        }
        QuestionKind::Calculation => {
            println!("🧮 {}", term.name);
            match &term.formula {
                Some(formula) => println!("   Formula: {}", formula),
                None => println!("   {}", term.definition),
            }
        }
        QuestionKind::General => {
            println!("🔍 Terms that may help");
            for other in &answer.terms {
                println!("   {}: {}", other.name, other.definition);
            }
        }
    }

    let others: Vec<&str> = answer
        .terms
        .iter()
        .skip(1)
        .map(|t| t.name.as_str())
        .collect();
    if !others.is_empty() && !matches!(answer.kind, QuestionKind::Comparison | QuestionKind::General) {
        println!();
        println!("   See also: {}", others.join(", "));
    }
    Ok(())
}
