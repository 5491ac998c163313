//! Line-based selection menu.
//!
//! Lists a catalog's groups with numbered entries, recommended entries
//! pre-selected, and reads commands until the user confirms or cancels.
//! Works over any `BufRead`/`Write` pair so it can be driven from tests.
//!
//! Commands:
//! - `3`, `1 4 7`, `2,5`, `3-6`: toggle entries
//! - `a` all, `n` none, `r` recommended only
//! - empty line or `d`: confirm
//! - `q`: cancel (end of input cancels too)

use std::io::{self, BufRead, Write};

use crate::catalog::{Catalog, CatalogEntry};

/// Run the picker. `Ok(None)` means the user cancelled.
///
/// The chosen entries are returned in catalog order.
pub fn pick<'a, C, R, W>(catalog: &'a C, input: &mut R, output: &mut W) -> io::Result<Option<Vec<&'a C::Entry>>>
where
    C: Catalog,
    R: BufRead,
    W: Write,
{
    let entries = catalog.entries();
    if entries.is_empty() {
        writeln!(output, "The {} catalog is empty.", C::KIND)?;
        return Ok(Some(Vec::new()));
    }

    let mut selected: Vec<bool> = entries.iter().map(|e| e.recommended()).collect();
    render(catalog, &selected, output)?;

    let mut line = String::new();
    loop {
        write!(
            output,
            "Toggle numbers, [a]ll, [n]one, [r]ecommended, [d]one, [q]uit: "
        )?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(None);
        }

        match line.trim().to_lowercase().as_str() {
            "" | "d" => break,
            "q" => return Ok(None),
            "a" => selected.iter_mut().for_each(|s| *s = true),
            "n" => selected.iter_mut().for_each(|s| *s = false),
            "r" => {
                for (flag, entry) in selected.iter_mut().zip(&entries) {
                    *flag = entry.recommended();
                }
            }
            other => match parse_numbers(other, entries.len()) {
                Ok(numbers) => {
                    for n in numbers {
                        selected[n - 1] = !selected[n - 1];
                    }
                }
                Err(message) => {
                    writeln!(output, "  {}", message)?;
                    continue;
                }
            },
        }
        render(catalog, &selected, output)?;
    }

    Ok(Some(
        entries
            .into_iter()
            .zip(selected)
            .filter_map(|(entry, chosen)| chosen.then_some(entry))
            .collect(),
    ))
}

fn render<C: Catalog, W: Write>(catalog: &C, selected: &[bool], output: &mut W) -> io::Result<()> {
    writeln!(output)?;
    writeln!(output, "=== {} ===", C::KIND)?;
    let mut number = 0;
    for group in catalog.groups() {
        writeln!(output)?;
        if group.description.is_empty() {
            writeln!(output, "{}", group.name)?;
        } else {
            writeln!(output, "{} - {}", group.name, group.description)?;
        }
        for entry in group.entries {
            let mark = if selected[number] { "x" } else { " " };
            number += 1;
            let star = if entry.recommended() { " *" } else { "" };
            if entry.description().is_empty() {
                writeln!(output, "  [{}] {:>3}. {}{}", mark, number, entry.name(), star)?;
            } else {
                writeln!(
                    output,
                    "  [{}] {:>3}. {}{} - {}",
                    mark,
                    number,
                    entry.name(),
                    star,
                    entry.description()
                )?;
            }
        }
    }
    let count = selected.iter().filter(|s| **s).count();
    writeln!(output)?;
    writeln!(output, "{} of {} selected (* = recommended)", count, selected.len())
}

/// Parse `1 4 7`, `2,5` and `3-6` into 1-based indices within `1..=max`
fn parse_numbers(text: &str, max: usize) -> Result<Vec<usize>, String> {
    let mut numbers = Vec::new();
    for token in text.split([' ', ',']).filter(|t| !t.is_empty()) {
        let (start, end) = match token.split_once('-') {
            Some((a, b)) => (parse_one(a, max)?, parse_one(b, max)?),
            None => {
                let n = parse_one(token, max)?;
                (n, n)
            }
        };
        if start > end {
            return Err(format!("Invalid range '{}'", token));
        }
        numbers.extend(start..=end);
    }
    Ok(numbers)
}

fn parse_one(text: &str, max: usize) -> Result<usize, String> {
    match text.trim().parse::<usize>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n),
        _ => Err(format!("'{}' is not a number between 1 and {}", text, max)),
    }
}
