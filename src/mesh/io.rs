//! Plain-text element-matrix files.
//!
//! Layout: the element count on the first line, the variable count on the
//! second, then per element one line of node indices followed by `n` rows of
//! `n` block values and a blank separator line.

use crate::core::traits::Scalar;
use crate::error::ImfError;
use crate::mesh::structure::ElementStructure;
use faer::Mat;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::warn;

/// Line source that remembers the number of the last line it handed out.
struct Lines<R> {
    inner: std::io::Lines<R>,
    last: usize,
}

impl<R: BufRead> Lines<R> {
    fn next(&mut self) -> Result<Option<(usize, String)>, ImfError> {
        match self.inner.next() {
            Some(l) => {
                self.last += 1;
                Ok(Some((self.last, l?)))
            }
            None => Ok(None),
        }
    }
}

/// Read an element structure.
///
/// The declared variable count is ignored; the structure spans `max node + 1`
/// variables.
pub fn read_element_matrix<T, R>(reader: R) -> Result<ElementStructure<T>, ImfError>
where
    T: Scalar + FromStr,
    R: BufRead,
{
    let mut lines = Lines { inner: reader.lines(), last: 0 };

    let (line, header) = lines
        .next()?
        .ok_or(ImfError::Parse { line: 1, msg: "missing element count".into() })?;
    let nb_elements: usize = header
        .trim()
        .parse()
        .map_err(|_| ImfError::Parse { line, msg: format!("bad element count '{}'", header.trim()) })?;
    // declared variable count, kept for compatibility
    lines.next()?;

    // the header is untrusted; grow as blocks actually arrive
    let mut blocks = Vec::with_capacity(nb_elements.min(1024));
    let mut max_node = None;
    while blocks.len() < nb_elements {
        let (line, text) = loop {
            match lines.next()? {
                Some((_, l)) if l.trim().is_empty() => continue,
                Some(found) => break found,
                None => {
                    warn!(read = blocks.len(), declared = nb_elements, "element file ended early");
                    return Err(ImfError::Parse {
                        line: lines.last,
                        msg: format!("expected {nb_elements} elements, found {}", blocks.len()),
                    });
                }
            }
        };
        let nodes = parse_row::<usize>(&text, line)?;
        let n = nodes.len();
        max_node = nodes.iter().copied().max().max(max_node);

        let mut values = Mat::<T>::zeros(n, n);
        for i in 0..n {
            let Some((line, text)) = lines.next()? else {
                warn!(element = blocks.len(), row = i, "incomplete element block");
                return Err(ImfError::Parse {
                    line: lines.last,
                    msg: format!("element {} has an incomplete block", blocks.len()),
                });
            };
            let row = parse_row::<T>(&text, line)?;
            if row.len() != n {
                return Err(ImfError::Parse { line, msg: format!("expected {n} values, found {}", row.len()) });
            }
            for (j, v) in row.into_iter().enumerate() {
                values[(i, j)] = v;
            }
        }
        blocks.push((nodes, values));
    }

    let total_vars = max_node.map_or(0, |m| m + 1);
    ElementStructure::from_elements(total_vars, blocks)
}

fn parse_row<V: FromStr>(text: &str, line: usize) -> Result<Vec<V>, ImfError> {
    text.split_whitespace()
        .map(|tok| tok.parse::<V>().map_err(|_| ImfError::Parse { line, msg: format!("cannot parse '{tok}'") }))
        .collect()
}

/// Write every non-empty element of `mesh` in the format `read_element_matrix` accepts.
pub fn write_element_matrix<T, W>(mesh: &ElementStructure<T>, mut out: W) -> Result<(), ImfError>
where
    T: Scalar + Display,
    W: Write,
{
    let live: Vec<_> = mesh.elements().filter(|el| !el.is_empty()).collect();
    writeln!(out, "{}", live.len())?;
    writeln!(out, "{}", mesh.total_vars())?;
    for el in live {
        let idx: Vec<String> = el.nodes().iter().map(ToString::to_string).collect();
        writeln!(out, "{}", idx.join(" "))?;
        for i in 0..el.size() {
            let row: Vec<String> = (0..el.size()).map(|j| el.values()[(i, j)].to_string()).collect();
            writeln!(out, "{}", row.join(" "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
