use crate::ai::Purpose;
use crate::context::{Attachment, EnvironmentFacts};

/// purpose별 프롬프트 템플릿 생성기
///
/// 모든 provider가 같은 프롬프트를 받도록 템플릿을 한 곳에서 관리합니다.
/// provider별 차이는 wire 형식에서만 처리합니다.
pub struct PromptTemplate;

/// 스크립트 이름 마커 (응답 후처리에서 사용)
pub const SCRIPT_NAME_MARKER: &str = "[SCRIPT_NAME:";

impl PromptTemplate {
    /// purpose에 맞는 템플릿에 환경 정보와 쿼리를 채워 넣음
    ///
    /// # Examples
    /// ```
    /// use bcopilot::ai::prompt_template::PromptTemplate;
    /// use bcopilot::ai::Purpose;
    /// use bcopilot::context::EnvironmentFacts;
    ///
    /// let env = EnvironmentFacts {
    ///     current_directory: "/home/user".to_string(),
    ///     username: "user".to_string(),
    ///     hostname: "box".to_string(),
    ///     os_version: "Ubuntu 22.04".to_string(),
    /// };
    /// let prompt = PromptTemplate::render(Purpose::Command, "list files", &env);
    /// assert!(prompt.contains("list files"));
    /// assert!(prompt.contains("/home/user"));
    /// ```
    pub fn render(purpose: Purpose, query: &str, env: &EnvironmentFacts) -> String {
        match purpose {
            Purpose::Command => Self::command(query, env),
            Purpose::Script => Self::script(query, env),
        }
    }

    fn command(query: &str, env: &EnvironmentFacts) -> String {
        format!(
            "You are a bash command generator. Convert natural language into a bash command for {os}.\n\
             Return exactly one line that can be executed directly, with no explanation.\n\
             If the task is too complex for a single command, reply: \
             \"This task cannot be done in one line, please use --script to generate a full script\".\n\
             \n\
             {env}\
             \n\
             Request: {query}\n",
            os = env.os_version,
            env = Self::environment_block(env),
            query = query,
        )
    }

    fn script(query: &str, env: &EnvironmentFacts) -> String {
        format!(
            "As a professional bash script developer, write a complete bash script for the following task.\n\
             \n\
             Task: {query}\n\
             \n\
             The script must be complete and executable, with appropriate comments and error handling.\n\
             It should run on {os}.\n\
             \n\
             Also choose a short, accurate English name for the script file (without extension).\n\
             The name may only contain lowercase letters, digits and underscores, at most 20 characters, \
             and should describe what the script does.\n\
             \n\
             Start your reply with the name in the form {marker} your_script_name], then give the full script.\n\
             \n\
             {env}",
            query = query,
            os = env.os_version,
            marker = SCRIPT_NAME_MARKER,
            env = Self::environment_block(env),
        )
    }

    fn environment_block(env: &EnvironmentFacts) -> String {
        format!(
            "User environment:\n\
             - Current directory: {}\n\
             - User: {}\n\
             - Hostname: {}\n\
             - System: {}\n",
            env.current_directory, env.username, env.hostname, env.os_version
        )
    }

    /// 첨부 파일 블록과 purpose별 마무리 지시문
    pub fn attachments(purpose: Purpose, attachments: &[Attachment]) -> String {
        if attachments.is_empty() {
            return String::new();
        }

        let mut section = String::from("\nRelated file contents:\n");
        for attachment in attachments {
            section.push_str(&format!(
                "\nFile: {}\n```\n{}\n```\n",
                attachment.name, attachment.content
            ));
        }

        section.push_str(match purpose {
            Purpose::Command => {
                "Generate a bash command related to these files to fulfil the user's request.\n"
            }
            Purpose::Script => {
                "Generate the bash script based on the file contents above and the user's request.\n"
            }
        });

        section
    }
}
