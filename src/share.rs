use std::path::Path;

use crate::error::ShareError;

/// Hands a finished export to other applications
pub trait Share {
    fn share(&self, path: &Path) -> Result<(), ShareError>;
}

/// Opens the file with the desktop's default handler for PNG images
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShare;

impl Share for SystemShare {
    fn share(&self, path: &Path) -> Result<(), ShareError> {
        log::info!("Sharing {}", path.display());
        open::that(path).map_err(|source| ShareError::Open {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Keeps the export where it is
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShare;

impl Share for NoShare {
    fn share(&self, path: &Path) -> Result<(), ShareError> {
        log::debug!("Sharing disabled, leaving {}", path.display());
        Ok(())
    }
}

/// Pick the share facility from the user's setting
pub fn share_for(enabled: bool) -> Box<dyn Share> {
    if enabled {
        Box::new(SystemShare)
    } else {
        Box::new(NoShare)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingShare {
        shared: RefCell<Vec<PathBuf>>,
    }

    impl Share for RecordingShare {
        fn share(&self, path: &Path) -> Result<(), ShareError> {
            self.shared.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn test_share_is_object_safe() {
        let recorder = RecordingShare::default();
        let share: &dyn Share = &recorder;
        share.share(Path::new("/tmp/a.png")).unwrap();
        assert_eq!(recorder.shared.borrow().as_slice(), &[PathBuf::from("/tmp/a.png")]);
    }

    #[test]
    fn test_disabled_share_does_nothing() {
        assert!(share_for(false).share(Path::new("/nonexistent/file.png")).is_ok());
    }
}
