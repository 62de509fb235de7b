use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Scratch run directory laid out the way the simulator expects.
pub struct RunDir {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl RunDir {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let dir = Self { _tmp: tmp, root };

        dir.write("betafiles.txt", "core\n");
        dir.write(
            "input/inputchk/core.def",
            "c core cross sections\n(5x,4(f10.5,3x))\n",
        );
        dir.write("modfile/coresd.dat", &table("0.05"));
        dir.write("modfile/core_mc0.dat", &table("1.25"));
        dir.write("effect_mc.txt", "key,sd\nPOWER,0.02\nFLOW,0.05\n");
        dir.write(
            "plant_mc0.inp",
            "* plant deck\n3000.0    ! POWER level\n12.5      ! FLOW fraction\n0.7 ! unrelated\n",
        );
        dir
    }

    pub fn write(&self, rel: &str, body: &str) {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
        fs::write(path, body).expect("write fixture");
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).expect("read output")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("mcvary").expect("binary built");
        cmd.arg("--root").arg(&self.root).env_remove("MCVARY_LOG");
        cmd
    }
}

/// Two full blocks of four-column data wrapped in header and trailer lines.
pub fn table(value: &str) -> String {
    let mut body = String::from(" core group constants\n   region 1\n");
    for i in 0..12 {
        body.push_str(&format!("  {}  {value}  {value}  {value}  {value}\n", i + 1));
        if i == 5 {
            body.push_str("   region 2\n");
        }
    }
    body.push_str(" end\n");
    body
}

#[allow(dead_code)]
pub fn numbers(line: &str) -> Vec<f64> {
    line.split_whitespace()
        .map(|t| t.parse().expect("numeric field"))
        .collect()
}

#[allow(dead_code)]
pub fn data_lines(body: &str) -> Vec<&str> {
    body.lines()
        .filter(|l| {
            l.split_whitespace()
                .next()
                .and_then(|t| t.chars().next())
                .is_some_and(|c| c.is_ascii_digit())
        })
        .collect()
}
