//! Plain-text table rendering
//!
//! Every derived table can be printed as one or more aligned text tables
//! instead of JSON. The first column is left aligned, the others right
//! aligned.

use std::io::{self, Write};

#[derive(Debug, Clone, Default)]
pub struct Table {
    title: Option<String>,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: None,
            header: header.into_iter().map(Into::into).collect(),
            rows: vec![],
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.rows
            .push(row.into_iter().map(|cell| cell.to_string()).collect());
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths = self.header.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    pub fn write_to<W>(&self, out: &mut W) -> io::Result<()>
    where
        W: Write + ?Sized,
    {
        let widths = self.widths();
        if let Some(title) = &self.title {
            writeln!(out, "{title}")?;
        }
        write_line(out, &self.header, &widths)?;
        let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        writeln!(out, "  {}", "-".repeat(total))?;
        for row in &self.rows {
            write_line(out, row, &widths)?;
        }
        Ok(())
    }
}

fn write_line<W>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()>
where
    W: Write + ?Sized,
{
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            if i == 0 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "  {}", line.trim_end())
}
