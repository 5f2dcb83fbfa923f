//! Ready-made entries for common application paths.
//!
//! Templates carry everything except the entry name and application name:
//!
//! ```
//! use appcontext_core::pathspec::templates;
//!
//! let log = templates::log_file().with_name("server.log").with_app_name("myapp");
//! assert!(log.validate().is_ok());
//! ```

use super::entry::PathEntry;
use super::types::{BaseDir, PathCategory, PathKind, PathPriority, Subcategory};

const MIB: u64 = 1024 * 1024;

/// JSON document storage, private to the owner.
pub fn json_storage() -> PathEntry {
    PathEntry {
        base_dir: BaseDir::Data,
        kind: PathKind::File,
        category: PathCategory::Data,
        subcategory: Subcategory::STORAGE,
        priority: PathPriority::High,
        default_perm: 0o600,
        owner_only: true,
        auto_created: true,
        backed_up: true,
        compressible: true,
        format: "json".into(),
        ..PathEntry::default()
    }
}

/// Primary application log, capped at 10 MiB.
pub fn log_file() -> PathEntry {
    PathEntry {
        base_dir: BaseDir::Runtime,
        kind: PathKind::File,
        category: PathCategory::Runtime,
        subcategory: Subcategory::LOGS,
        priority: PathPriority::Medium,
        default_perm: 0o644,
        owner_only: true,
        auto_created: true,
        format: "text".into(),
        max_size: 10 * MIB,
        retention_days: 30,
        ..PathEntry::default()
    }
}

/// Primary configuration file: mandatory and versioned.
pub fn config_file() -> PathEntry {
    PathEntry {
        base_dir: BaseDir::Config,
        kind: PathKind::File,
        category: PathCategory::Config,
        subcategory: Subcategory::NONE,
        priority: PathPriority::Critical,
        default_perm: 0o644,
        owner_only: true,
        mandatory: true,
        backed_up: true,
        versioned: true,
        format: "toml".into(),
        ..PathEntry::default()
    }
}

/// Per-process state directories.
pub fn process_state() -> PathEntry {
    PathEntry {
        base_dir: BaseDir::Data,
        kind: PathKind::Directory,
        category: PathCategory::Data,
        subcategory: Subcategory::PROCESSES,
        priority: PathPriority::High,
        default_perm: 0o755,
        owner_only: true,
        auto_created: true,
        backed_up: true,
        has_subdirs: true,
        max_children: 1000,
        retention_days: 90,
        ..PathEntry::default()
    }
}

/// User projects, kept permanently.
pub fn projects() -> PathEntry {
    PathEntry {
        base_dir: BaseDir::Data,
        kind: PathKind::Directory,
        category: PathCategory::Data,
        subcategory: Subcategory::PROJECTS,
        priority: PathPriority::High,
        default_perm: 0o755,
        owner_only: true,
        auto_created: true,
        backed_up: true,
        has_subdirs: true,
        max_children: 100,
        ..PathEntry::default()
    }
}

/// Statistics file, capped at 5 MiB and kept for a year.
pub fn stats() -> PathEntry {
    PathEntry {
        base_dir: BaseDir::Runtime,
        kind: PathKind::File,
        category: PathCategory::Runtime,
        subcategory: Subcategory::STATS,
        priority: PathPriority::Medium,
        default_perm: 0o644,
        owner_only: true,
        auto_created: true,
        format: "json".into(),
        max_size: 5 * MIB,
        retention_days: 365,
        ..PathEntry::default()
    }
}

/// Backup sets. Not itself backed up.
pub fn backup_storage() -> PathEntry {
    PathEntry {
        base_dir: BaseDir::Data,
        kind: PathKind::Directory,
        category: PathCategory::Data,
        subcategory: Subcategory::BACKUPS,
        priority: PathPriority::Medium,
        default_perm: 0o700,
        owner_only: true,
        compressible: true,
        has_subdirs: true,
        max_children: 50,
        retention_days: 90,
        cleanup_age: 30,
        ..PathEntry::default()
    }
}

/// Short-lived cache of uploaded files.
pub fn upload_cache() -> PathEntry {
    PathEntry {
        base_dir: BaseDir::Cache,
        kind: PathKind::Directory,
        category: PathCategory::Cache,
        subcategory: Subcategory::CACHE,
        priority: PathPriority::Low,
        default_perm: 0o750,
        owner_only: true,
        auto_created: true,
        has_subdirs: true,
        max_children: 1000,
        retention_days: 30,
        cleanup_age: 7,
        ..PathEntry::default()
    }
}

/// Generated exports; may be shared with other users.
pub fn export_dir() -> PathEntry {
    PathEntry {
        base_dir: BaseDir::Data,
        kind: PathKind::Directory,
        category: PathCategory::Data,
        subcategory: Subcategory::EXPORTS,
        priority: PathPriority::Medium,
        default_perm: 0o755,
        auto_created: true,
        compressible: true,
        has_subdirs: true,
        max_children: 100,
        retention_days: 60,
        cleanup_age: 14,
        ..PathEntry::default()
    }
}

/// Every template, paired with a short identifier.
pub fn all() -> Vec<(&'static str, PathEntry)> {
    vec![
        ("json_storage", json_storage()),
        ("log_file", log_file()),
        ("config_file", config_file()),
        ("process_state", process_state()),
        ("projects", projects()),
        ("stats", stats()),
        ("backup_storage", backup_storage()),
        ("upload_cache", upload_cache()),
        ("export_dir", export_dir()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_validates_once_named() {
        for (id, template) in all() {
            let entry = template.with_name("item").with_app_name("myapp");
            assert_eq!(entry.validate(), Ok(()), "template {id} should be valid");
        }
    }

    #[test]
    fn test_templates_are_unnamed() {
        for (id, template) in all() {
            assert!(template.name.is_empty(), "template {id} carries a name");
            assert!(template.app_name.is_empty(), "template {id} carries an app name");
        }
    }

    #[test]
    fn test_template_override_keeps_remaining_fields() {
        let entry = PathEntry {
            name: "uploads".into(),
            app_name: "myapp".into(),
            max_children: 10,
            ..upload_cache()
        };

        assert_eq!(entry.max_children, 10);
        assert_eq!(entry.default_perm, 0o750);
        assert_eq!(entry.subcategory, Subcategory::CACHE);
        assert_eq!(entry.validate(), Ok(()));
    }
}
