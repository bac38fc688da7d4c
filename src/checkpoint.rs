use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    record::Record,
    xlsx_writer::{DatasetWriter, WriteError},
};

/// Owns the growing dataset and writes a snapshot every `interval` records.
pub struct Checkpointer<W> {
    records: Vec<Record>,
    interval: NonZeroUsize,
    out_dir: PathBuf,
    backup_prefix: String,
    writer: W,
    snapshots: Vec<PathBuf>,
}

impl<W: DatasetWriter> Checkpointer<W> {
    pub fn new(
        writer: W,
        out_dir: impl Into<PathBuf>,
        backup_prefix: impl Into<String>,
        interval: NonZeroUsize,
    ) -> Self {
        Self {
            records: vec![],
            interval,
            out_dir: out_dir.into(),
            backup_prefix: backup_prefix.into(),
            writer,
            snapshots: vec![],
        }
    }

    /// Appends `record`, and returns the snapshot path if one was written.
    pub fn push(&mut self, record: Record) -> Result<Option<&Path>, WriteError> {
        self.records.push(record);
        let count = self.records.len();
        if count % self.interval != 0 {
            return Ok(None);
        }
        let path = self.out_dir.join(snapshot_file_name(&self.backup_prefix, count));
        self.writer.write(&path, &self.records)?;
        info!("Snapshot at {count} records: {path:?}");
        self.snapshots.push(path);
        Ok(self.snapshots.last().map(PathBuf::as_path))
    }

    /// Writes the whole dataset to `file_name` under the output directory.
    pub fn finish(mut self, file_name: &Path) -> Result<Finished<W>, WriteError> {
        let output = self.out_dir.join(file_name);
        self.writer.write(&output, &self.records)?;
        Ok(Finished {
            records: self.records,
            snapshots: self.snapshots,
            output,
            writer: self.writer,
        })
    }
}

pub struct Finished<W> {
    pub records: Vec<Record>,
    pub snapshots: Vec<PathBuf>,
    pub output: PathBuf,
    pub writer: W,
}

pub fn snapshot_file_name(backup_prefix: &str, count: usize) -> String {
    format!("{backup_prefix}_backup_{count:04}.xlsx")
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        num::NonZeroUsize,
        path::{Path, PathBuf},
    };

    use super::{snapshot_file_name, Checkpointer};
    use crate::{
        record::Record,
        xlsx_writer::{DatasetWriter, WriteError},
    };

    /// Remembers every write as (path, names of the written records).
    #[derive(Default)]
    pub struct MemoryWriter {
        pub writes: Vec<(PathBuf, Vec<String>)>,
    }

    impl DatasetWriter for MemoryWriter {
        fn write(&mut self, path: &Path, records: &[Record]) -> Result<(), WriteError> {
            let names = records
                .iter()
                .map(|r| r.get("Nome").unwrap_or_default().to_owned())
                .collect();
            self.writes.push((path.to_owned(), names));
            Ok(())
        }
    }

    fn record(i: usize) -> Record {
        Record::new("Nome", format!("soc{i}"))
    }

    #[test]
    fn file_names() {
        assert_eq!(snapshot_file_name("coni_bas", 300), "coni_bas_backup_0300.xlsx");
        assert_eq!(snapshot_file_name("coni", 12000), "coni_backup_12000.xlsx");
    }

    #[test]
    fn snapshot_every_interval() {
        let interval = NonZeroUsize::new(3).unwrap();
        let mut checkpointer = Checkpointer::new(MemoryWriter::default(), "out", "t", interval);
        let mut written = vec![];
        for i in 1..=7 {
            if let Some(path) = checkpointer.push(record(i)).unwrap() {
                written.push((i, path.to_owned()));
            }
        }
        assert_eq!(
            written,
            [
                (3, PathBuf::from("out/t_backup_0003.xlsx")),
                (6, PathBuf::from("out/t_backup_0006.xlsx")),
            ]
        );

        let finished = checkpointer.finish(Path::new("t.xlsx")).unwrap();
        assert_eq!(finished.output, PathBuf::from("out/t.xlsx"));
        assert_eq!(finished.records.len(), 7);
        let writes = finished.writer.writes;
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0].1, ["soc1", "soc2", "soc3"]);
        assert_eq!(writes[1].1.len(), 6);
        assert_eq!(writes[2].0, PathBuf::from("out/t.xlsx"));
        assert_eq!(writes[2].1.len(), 7);
    }
}
