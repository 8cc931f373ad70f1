//! Build-instruction template.

/// Inputs for the generated Dockerfile.
///
/// `projects_dir` is relative to the build context; the dependency manifest is
/// always expected at `<projects_dir>/requirements.txt`.
#[derive(Debug, Clone)]
pub struct DockerfileTemplate<'a> {
    pub base_image: &'a str,
    pub projects_dir: &'a str,
    pub entrypoint: &'a str,
}

/// File name the install step expects the manifest under.
pub const MANIFEST_FILE: &str = "requirements.txt";

impl DockerfileTemplate<'_> {
    /// Context-relative path of the dependency manifest.
    pub fn manifest_path(&self) -> String {
        format!("{}/{}", self.projects_dir.trim_end_matches('/'), MANIFEST_FILE)
    }

    pub fn render(&self) -> String {
        let projects = self.projects_dir.trim_end_matches('/');
        format!(
            "FROM {base}\n\
             WORKDIR /app\n\
             COPY {manifest} /app/{manifest_file}\n\
             RUN pip install -r /app/{manifest_file}\n\
             COPY {projects}/ /app/projects/\n\
             CMD [\"python\", \"/app/projects/{entrypoint}\"]\n",
            base = self.base_image,
            manifest = self.manifest_path(),
            manifest_file = MANIFEST_FILE,
            projects = projects,
            entrypoint = self.entrypoint,
        )
    }
}
