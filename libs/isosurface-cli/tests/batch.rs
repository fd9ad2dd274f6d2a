//! End-to-end batch runs over GrADS files written to a scratch directory.

use std::fs;
use std::path::{Path, PathBuf};

use isosurface::ExtractionConfig;
use isosurface_cli::{collect_inputs, run_batch, BatchOptions};
use mesh_export::{read_stl, MeshFormat};

struct Scratch(PathBuf);

impl Scratch {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("isurf-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        Scratch(dir)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// Writes `<name>.ctl` and `<name>.bin` describing an `n`³ sphere field that
/// is 1 at the centre and falls off linearly with distance.
fn write_sphere(dir: &Path, name: &str, n: usize) {
    let step = 1.0 / (n - 1) as f32;
    let mut bytes = Vec::with_capacity(n * n * n * 4);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let p = [x, y, z].map(|i| i as f32 * step - 0.5);
                let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
                bytes.extend((1.0 - 2.0 * r).to_be_bytes());
            }
        }
    }
    fs::write(dir.join(format!("{name}.bin")), bytes).unwrap();

    let ctl = format!(
        "DSET ^{name}.bin\n\
         TITLE sphere\n\
         UNDEF -9.99e8\n\
         OPTIONS big_endian\n\
         XDEF {n} LINEAR -0.5 {step}\n\
         YDEF {n} LINEAR -0.5 {step}\n\
         ZDEF {n} LINEAR -0.5 {step}\n\
         TDEF 1 LINEAR 00z01jan2000 1hr\n\
         VARS 1\n\
         f {n} 99 falloff\n\
         ENDVARS\n"
    );
    fs::write(dir.join(format!("{name}.ctl")), ctl).unwrap();
}

fn options(format: MeshFormat, isovalues: Vec<f32>) -> BatchOptions {
    BatchOptions {
        isovalues,
        format,
        extraction: ExtractionConfig::default(),
    }
}

#[test]
fn single_file_writes_stl_per_isovalue() {
    let scratch = Scratch::new("single");
    write_sphere(scratch.path(), "ball", 12);
    let out = scratch.path().join("meshes");

    let report = run_batch(
        &scratch.path().join("ball.ctl"),
        &out,
        &options(MeshFormat::Stl, vec![0.2, 0.6]),
    )
    .unwrap();

    assert!(report.is_success());
    assert_eq!(report.processed.len(), 1);
    let outputs = &report.processed[0].outputs;
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].path, out.join("ball_0.2.stl"));
    assert_eq!(outputs[1].path, out.join("ball_0.6.stl"));

    for output in outputs {
        let mesh = read_stl(&fs::read(&output.path).unwrap()).unwrap();
        assert!(output.triangles > 0);
        assert_eq!(mesh.triangles.len(), output.triangles);
        assert_eq!(mesh.header_text(), format!("isovalue {}", output.isovalue));
    }
    // The higher isovalue is a smaller sphere.
    assert!(outputs[1].triangles < outputs[0].triangles);
}

#[test]
fn directory_batch_isolates_failures() {
    let scratch = Scratch::new("dir");
    let input = scratch.path().join("in");
    fs::create_dir_all(&input).unwrap();
    write_sphere(&input, "a", 8);
    write_sphere(&input, "c", 8);
    // Descriptor whose data file is missing.
    fs::write(input.join("b.ctl"), "DSET ^nothing.bin\nXDEF 2 LINEAR 0 1\nYDEF 2 LINEAR 0 1\nZDEF 2 LINEAR 0 1\nVARS 1\nv 2 99 x\nENDVARS\n").unwrap();
    fs::write(input.join("notes.txt"), "not a descriptor").unwrap();
    let out = scratch.path().join("out");

    let inputs = collect_inputs(&input).unwrap();
    let names: Vec<_> = inputs.iter().map(|p| p.file_name().unwrap().to_owned()).collect();
    assert_eq!(names, vec!["a.ctl", "b.ctl", "c.ctl"]);

    let report = run_batch(&input, &out, &options(MeshFormat::Obj, vec![0.0])).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.processed.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].0.ends_with("b.ctl"));
    assert!(report.failed[0].1.contains("nothing.bin"));

    assert!(out.join("a.obj").is_file());
    assert!(out.join("c.obj").is_file());
    assert!(!out.join("b.obj").exists());

    let text = fs::read_to_string(out.join("a.obj")).unwrap();
    assert!(text.contains("o isosurface_0"));
    let vertices = text.lines().filter(|l| l.starts_with("v ")).count();
    let faces = text.lines().filter(|l| l.starts_with("f ")).count();
    assert_eq!(vertices, faces * 3);
    assert_eq!(faces, report.processed[0].outputs[0].triangles);
}

#[test]
fn obj_batch_writes_one_document_per_input() {
    let scratch = Scratch::new("obj");
    write_sphere(scratch.path(), "ball", 10);
    let out = scratch.path().join("out");

    let report = run_batch(
        &scratch.path().join("ball.ctl"),
        &out,
        &options(MeshFormat::Obj, vec![0.2, 0.6]),
    )
    .unwrap();
    let outputs = &report.processed[0].outputs;
    assert!(outputs.iter().all(|o| o.path == out.join("ball.obj")));

    let text = fs::read_to_string(out.join("ball.obj")).unwrap();
    let objects: Vec<&str> = text.lines().filter(|l| l.starts_with("o ")).collect();
    assert_eq!(objects, vec!["o isosurface_0.2", "o isosurface_0.6"]);

    let total: usize = outputs.iter().map(|o| o.triangles).sum();
    assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), total);
    let last = format!("f {} {} {}", 3 * total - 2, 3 * total - 1, 3 * total);
    assert_eq!(text.lines().last(), Some(last.as_str()));
}

#[test]
fn parallel_batch_matches_sequential() {
    let scratch = Scratch::new("parallel");
    write_sphere(scratch.path(), "ball", 10);
    let ctl = scratch.path().join("ball.ctl");

    let seq_out = scratch.path().join("seq");
    let par_out = scratch.path().join("par");
    run_batch(&ctl, &seq_out, &options(MeshFormat::Stl, vec![0.3])).unwrap();
    let parallel = BatchOptions {
        extraction: ExtractionConfig::new(true, 1).unwrap(),
        ..options(MeshFormat::Stl, vec![0.3])
    };
    run_batch(&ctl, &par_out, &parallel).unwrap();

    let seq = fs::read(seq_out.join("ball_0.3.stl")).unwrap();
    let par = fs::read(par_out.join("ball_0.3.stl")).unwrap();
    assert_eq!(seq, par);
}

#[test]
fn missing_input_is_a_batch_error() {
    let scratch = Scratch::new("missing");
    let result = run_batch(
        &scratch.path().join("absent"),
        &scratch.path().join("out"),
        &options(MeshFormat::Obj, vec![1.0]),
    );
    assert!(result.is_err());
}

#[test]
fn empty_surface_still_writes_a_file() {
    let scratch = Scratch::new("empty");
    write_sphere(scratch.path(), "ball", 6);
    let out = scratch.path().join("out");

    let report = run_batch(&scratch.path().join("ball.ctl"), &out, &options(MeshFormat::Stl, vec![5.0])).unwrap();
    assert_eq!(report.processed[0].outputs[0].triangles, 0);
    assert_eq!(fs::read(out.join("ball_5.stl")).unwrap().len(), 84);
}
