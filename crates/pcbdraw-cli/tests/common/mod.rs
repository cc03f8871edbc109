use std::path::{Path, PathBuf};

pub const BOARD: &str = r#"
components:
  - reference: R1
    footprint: "Passive:R_Axial"
    position: [10, 10]
    value: 4k7
  - reference: U1
    footprint: "Missing:SOIC-8"
    position: [20, 10]
    rotation: -90
substrate:
  layers:
    Edge.Cuts:
      - type: rect
        start: [0, 0]
        end: [30, 20]
        width: 0.1
    F.SilkS:
      - type: segment
        start: [2, 2]
        end: [8, 2]
        width: 0.15
  pads:
    - at: [5, 15]
      size: [1.6, 1.6]
      shape: circle
      layers: [F.Cu, B.Cu]
      drill: [0.8, 0.8]
"#;

pub const RESISTOR: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10mm" height="2.5mm" viewBox="0 0 1000 250">
  <circle id="origin" cx="100" cy="125" r="1"/>
  <rect id="body" x="100" y="0" width="800" height="250" style="fill:#d2b48c"/>
  <rect id="res_band1" x="200" y="0" width="50" height="250" style="fill:#000;display:none"/>
  <rect id="res_band2" x="300" y="0" width="50" height="250" style="fill:#000;display:none"/>
  <rect id="res_band3" x="400" y="0" width="50" height="250" style="fill:#000;display:none"/>
</svg>"#;

/// Board file plus a library root holding `Passive:R_Axial`.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("board.yaml"), BOARD).expect("write board");
        let lib = dir.path().join("libs/Passive");
        std::fs::create_dir_all(&lib).expect("create library");
        std::fs::write(lib.join("R_Axial.svg"), RESISTOR).expect("write footprint");
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn board(&self) -> PathBuf {
        self.path("board.yaml")
    }

    pub fn libs(&self) -> PathBuf {
        self.path("libs")
    }
}

pub fn arg(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}
