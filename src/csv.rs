//! Line-oriented CSV reading and writing. The formats this crate touches are
//! simple enough that splitting on commas is the whole grammar.

use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

pub struct CsvWriter {
    writer: BufWriter<File>,
}

impl CsvWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Writes one comma-separated record.
    pub fn append<R>(&mut self, record: R) -> Result<(), io::Error>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut first = true;
        for field in record {
            if !first {
                self.writer.write_all(b",")?;
            }
            first = false;
            self.writer.write_all(field.as_ref().as_bytes())?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Writes a raw line verbatim, for non-tabular preamble such as YAML
    /// frontmatter.
    pub fn line(&mut self, line: &str) -> Result<(), io::Error> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), io::Error> {
        self.writer.flush()
    }
}

pub struct CsvReader<R: BufRead> {
    lines: Lines<R>,
}

impl CsvReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> CsvReader<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    pub fn read(&mut self) -> Option<Result<Vec<String>, io::Error>> {
        self.lines
            .next()
            .map(|line| line.map(|line| line.split(',').map(ToString::to_string).collect()))
    }
}

impl<R: BufRead> Iterator for CsvReader<R> {
    type Item = Result<Vec<String>, io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_records() {
        let mut reader = CsvReader::from_reader("a,b,c\n1,2,3".as_bytes());
        assert_eq!(
            vec!["a", "b", "c"],
            reader.read().unwrap().unwrap()
        );
        assert_eq!(vec!["1", "2", "3"], reader.read().unwrap().unwrap());
        assert!(reader.read().is_none());
    }

    #[test]
    fn blank_line_is_a_single_empty_field() {
        let mut reader = CsvReader::from_reader("\n".as_bytes());
        assert_eq!(vec![""], reader.read().unwrap().unwrap());
    }

    #[test]
    fn writes_records_and_lines() {
        let dir = std::env::temp_dir().join("swissdraw-csv-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.csv");
        let mut writer = CsvWriter::create(&path).unwrap();
        writer.line("---").unwrap();
        writer.append(["t1", "t2"]).unwrap();
        writer.append([String::from("0"), String::from("1")]).unwrap();
        writer.flush().unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!("---\nt1,t2\n0,1\n", written);
    }
}
