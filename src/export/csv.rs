use std::io::Write;
use std::marker::PhantomData;

use super::records::Record;
use crate::error::Result;

/// Writes one record kind as CSV: a header line, then one line per record.
///
/// Fields containing a comma, quote, CR or LF are quoted with embedded
/// quotes doubled; everything else is written bare. Lines end with `\n`.
pub struct CsvWriter<W: Write, R: Record> {
    out: W,
    rows: usize,
    _record: PhantomData<R>,
}

impl<W: Write, R: Record> CsvWriter<W, R> {
    pub fn new(mut out: W) -> Result<Self> {
        write_line(&mut out, R::HEADER.iter().copied())?;
        Ok(Self {
            out,
            rows: 0,
            _record: PhantomData,
        })
    }

    pub fn write(&mut self, record: &R) -> Result<()> {
        let fields = record.fields();
        write_line(&mut self.out, fields.iter().map(String::as_str))?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far, header excluded.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn write_line<'a>(out: &mut impl Write, fields: impl Iterator<Item = &'a str>) -> Result<()> {
    let line = fields.map(escape).collect::<Vec<_>>().join(",");
    writeln!(out, "{line}")?;
    Ok(())
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
