use std::path::Path;

/// Build system of the project holding the catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    /// qmake project (`*.pro`)
    Qmake,
    /// CMake project (`CMakeLists.txt`)
    CMake,
    Generic,
}

pub fn detect_project_type(base_dir: &Path) -> ProjectType {
    if base_dir.join("CMakeLists.txt").exists() {
        ProjectType::CMake
    } else if has_pro_file(base_dir) {
        ProjectType::Qmake
    } else {
        ProjectType::Generic
    }
}

fn has_pro_file(base_dir: &Path) -> bool {
    std::fs::read_dir(base_dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "pro")
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

/// Directory names skipped while looking for catalogs
pub fn get_default_exclusions(project_type: ProjectType) -> Vec<&'static str> {
    let mut exclusions = vec![".git", ".svn", ".hg", ".idea", ".vscode", ".DS_Store"];

    match project_type {
        ProjectType::Qmake => {
            // Shadow builds and the intermediate dirs qmake generates
            exclusions.extend_from_slice(&["debug", "release", ".moc", ".obj", ".ui", "tmp"]);
        }
        ProjectType::CMake => {
            exclusions.extend_from_slice(&["build", "CMakeFiles", "_deps", "out"]);
        }
        ProjectType::Generic => {
            exclusions.extend_from_slice(&["node_modules", "build", "dist", "target"]);
        }
    }

    exclusions
}
