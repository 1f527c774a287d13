use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// 스피너 스타일 (AI 응답 대기 중)
///
/// 터미널이 아니면 indicatif가 자동으로 숨깁니다.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// 스피너 없이 진행하는 경우용 (테스트, 파이프 출력)
pub fn hidden_spinner() -> ProgressBar {
    ProgressBar::hidden()
}
