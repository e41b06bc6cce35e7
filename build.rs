use chrono::Utc;

fn main() {
    // Build timestamp reported by GET /api/health / 健康检查返回的构建时间
    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);

    // Only rerun when the build script itself changes
    println!("cargo:rerun-if-changed=build.rs");
}
