use anyhow::anyhow;
use formatx::formatx;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub trait Output: Debug {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes
    /// to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    /// The file template takes the location key then the file extension, e.g. `"{}.{}"`.
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file_name = formatx!(&self.file_template, location_key, file_extension)
            .map_err(|err| anyhow!("Could not apply file template: {err:?}"))?;
        Ok(BufWriter::new(File::create(
            self.directory_path.join(file_name),
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

/// Holds every written "file" in memory, keyed by `<location key>.<extension>`, so a run's
/// reports can be inspected without touching the filesystem.
#[derive(Clone, Debug, Default)]
pub struct MemoryOutput(Arc<Mutex<IndexMap<String, Vec<u8>>>>);

impl MemoryOutput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn contents(&self, location_key: &str, file_extension: &str) -> Option<String> {
        self.0
            .lock()
            .get(&file_name(location_key, file_extension))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn file_names(&self) -> Vec<String> {
        self.0.lock().keys().cloned().collect()
    }
}

impl Output for MemoryOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file_name = file_name(location_key, file_extension);
        // a repeated key starts the file again, as creating a real file would
        self.0.lock().insert(file_name.clone(), vec![]);

        Ok(MemoryFileWriter {
            files: self.0.clone(),
            file_name,
        })
    }
}

impl Output for &MemoryOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <MemoryOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

fn file_name(location_key: &str, file_extension: &str) -> String {
    format!("{location_key}.{file_extension}")
}

/// Represents a writer for an individual "file".
struct MemoryFileWriter {
    files: Arc<Mutex<IndexMap<String, Vec<u8>>>>,
    file_name: String,
}

impl Write for MemoryFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.files
            .lock()
            .entry(self.file_name.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
