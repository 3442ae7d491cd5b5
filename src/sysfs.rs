//! Sysfs GPIO access
//!
//! The kernel's `/sys/class/gpio` interface covers what the register path
//! does not, chiefly blocking until an edge arrives. A [`SysfsNode`] is
//! built from nothing but a GPIO number.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;

use crate::capability::{Direction, Level};
use crate::error::{Error, Result};

/// Default sysfs GPIO class directory
pub const SYSFS_ROOT: &str = "/sys/class/gpio";

/// Edge that raises a sysfs value event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    None,
    Rising,
    Falling,
    Both,
}

impl Edge {
    fn as_str(self) -> &'static str {
        match self {
            Edge::None => "none",
            Edge::Rising => "rising",
            Edge::Falling => "falling",
            Edge::Both => "both",
        }
    }
}

/// A GPIO exposed through sysfs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsNode {
    number: u8,
    root: PathBuf,
}

impl SysfsNode {
    /// Node under `/sys/class/gpio`
    pub fn new(number: u8) -> Self {
        Self::with_root(number, SYSFS_ROOT)
    }

    /// Node under another class directory
    pub fn with_root(number: u8, root: impl Into<PathBuf>) -> Self {
        Self {
            number,
            root: root.into(),
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// The `gpioN` directory
    pub fn dir(&self) -> PathBuf {
        self.root.join(format!("gpio{}", self.number))
    }

    fn attr(&self, name: &str) -> PathBuf {
        self.dir().join(name)
    }

    pub fn is_exported(&self) -> bool {
        self.dir().exists()
    }

    /// Ask the kernel to create the `gpioN` directory
    pub fn export(&self) -> Result<()> {
        if self.is_exported() {
            return Ok(());
        }
        debug!("exporting GPIO {} via sysfs", self.number);
        write_attr(&self.root.join("export"), &self.number.to_string())
    }

    /// Remove the `gpioN` directory
    pub fn unexport(&self) -> Result<()> {
        if !self.is_exported() {
            return Ok(());
        }
        debug!("unexporting GPIO {} via sysfs", self.number);
        write_attr(&self.root.join("unexport"), &self.number.to_string())
    }

    pub fn set_direction(&self, direction: Direction) -> Result<()> {
        let value = match direction {
            Direction::In => "in",
            Direction::Out => "out",
        };
        write_attr(&self.attr("direction"), value)
    }

    pub fn set_value(&self, value: Level) -> Result<()> {
        let value = match value {
            Level::Low => "0",
            Level::High => "1",
        };
        write_attr(&self.attr("value"), value)
    }

    pub fn value(&self) -> Result<Level> {
        let path = self.attr("value");
        let content = fs::read_to_string(&path).map_err(|source| Error::Sysfs {
            path: path.clone(),
            source,
        })?;
        Ok(Level::from(content.trim() == "1"))
    }

    /// Choose which edges wake [`wait_for_edge`](Self::wait_for_edge)
    pub fn set_edge(&self, edge: Edge) -> Result<()> {
        write_attr(&self.attr("edge"), edge.as_str())
    }

    /// Block until the configured edge occurs
    ///
    /// Returns the level sampled after the event, or `None` on timeout.
    /// `None` as timeout waits indefinitely.
    pub fn wait_for_edge(&self, timeout: Option<Duration>) -> Result<Option<Level>> {
        let path = self.attr("value");
        let sysfs_err = |source: io::Error| Error::Sysfs {
            path: path.clone(),
            source,
        };

        let mut file = File::open(&path).map_err(sysfs_err)?;
        // Consume the current state so only a new event wakes poll
        let mut buf = [0u8; 4];
        let _ = file.read(&mut buf).map_err(sysfs_err)?;

        let mut pfd = libc::pollfd {
            fd: file.as_raw_fd(),
            events: libc::POLLPRI | libc::POLLERR,
            revents: 0,
        };
        let timeout_ms = match timeout {
            Some(t) => t.as_millis().min(libc::c_int::MAX as u128) as libc::c_int,
            None => -1,
        };

        let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if rc < 0 {
            return Err(sysfs_err(io::Error::last_os_error()));
        }
        if rc == 0 {
            return Ok(None);
        }

        file.seek(SeekFrom::Start(0)).map_err(sysfs_err)?;
        let n = file.read(&mut buf).map_err(sysfs_err)?;
        Ok(Some(Level::from(buf[..n].first() == Some(&b'1'))))
    }
}

fn write_attr(path: &Path, value: &str) -> Result<()> {
    fs::write(path, value).map_err(|source| Error::Sysfs {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exported(root: &Path, number: u8) -> SysfsNode {
        let node = SysfsNode::with_root(number, root);
        fs::create_dir(node.dir()).unwrap();
        fs::write(node.attr("value"), "0\n").unwrap();
        node
    }

    #[test]
    fn test_default_paths() {
        let node = SysfsNode::new(17);
        assert_eq!(node.dir(), PathBuf::from("/sys/class/gpio/gpio17"));
    }

    #[test]
    fn test_export_writes_number() {
        let dir = tempdir().unwrap();
        let node = SysfsNode::with_root(22, dir.path());
        node.export().unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("export")).unwrap(), "22");
    }

    #[test]
    fn test_export_skips_existing() {
        let dir = tempdir().unwrap();
        exported(dir.path(), 4).export().unwrap();
        assert!(!dir.path().join("export").exists());
    }

    #[test]
    fn test_attributes() {
        let dir = tempdir().unwrap();
        let node = exported(dir.path(), 4);

        node.set_direction(Direction::Out).unwrap();
        node.set_edge(Edge::Falling).unwrap();
        node.set_value(Level::High).unwrap();

        assert_eq!(fs::read_to_string(node.attr("direction")).unwrap(), "out");
        assert_eq!(fs::read_to_string(node.attr("edge")).unwrap(), "falling");
        assert_eq!(node.value().unwrap(), Level::High);
    }

    #[test]
    fn test_missing_node_reports_path() {
        let dir = tempdir().unwrap();
        let node = SysfsNode::with_root(9, dir.path());
        match node.value() {
            Err(Error::Sysfs { path, .. }) => assert!(path.ends_with("gpio9/value")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_wait_times_out_without_event() {
        // Regular files never report POLLPRI
        let dir = tempdir().unwrap();
        let node = exported(dir.path(), 4);
        let result = node.wait_for_edge(Some(Duration::from_millis(10))).unwrap();
        assert_eq!(result, None);
    }
}
