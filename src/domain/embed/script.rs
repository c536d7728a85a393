use rand::distributions::{Distribution, Uniform};

/// 생성되는 임베드 코드 길이
pub const EMBED_CODE_LENGTH: usize = 26;

const EMBED_CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// `/embed.js?id=` 로더 스크립트 템플릿
const LOADER_TEMPLATE: &str = r#"(function() {
  var formId = "{{FORM_ID}}";
  var baseUrl = "{{BASE_URL}}";
  
  // Create iframe
  var iframe = document.createElement('iframe');
  iframe.src = baseUrl + '/forms/' + formId;
  iframe.style.width = '100%';
  iframe.style.border = 'none';
  iframe.style.minHeight = '400px';
  iframe.style.borderRadius = '8px';
  iframe.style.backgroundColor = '#ffffff';
  
  // Handle iframe resizing
  iframe.onload = function() {
    window.addEventListener('message', function(e) {
      if (e.origin !== baseUrl) return;
      if (e.data.type === 'resize' && e.data.formId === formId) {
        iframe.style.height = e.data.height + 'px';
      }
    });
  };
  
  // Find the container and append iframe
  var container = document.getElementById('ai-form-' + formId);
  if (container) {
    container.appendChild(iframe);
  } else {
    console.error('Container element not found: ai-form-' + formId);
  }
})();"#;

/// 대시보드에서 복사해 붙이는 인라인 임베드 스크립트 템플릿
const INLINE_TEMPLATE: &str = r#"<div id="ai-form-{{EMBED_CODE}}"></div>
<script>
  (function() {
    var iframe = document.createElement('iframe');
    iframe.src = '{{BASE_URL}}/embed/{{EMBED_CODE}}';
    iframe.style.width = '100%';
    iframe.style.border = 'none';
    iframe.style.minHeight = '400px';
    iframe.style.borderRadius = '8px';
    iframe.onload = function() {
      window.addEventListener('message', function(e) {
        if (e.origin !== '{{BASE_URL}}') return;
        if (e.data.type === 'resize' && e.data.embedCode === '{{EMBED_CODE}}') {
          iframe.style.height = e.data.height + 'px';
        }
      });
    };
    document.getElementById('ai-form-{{EMBED_CODE}}').appendChild(iframe);
  })();
</script>"#;

/// 임베드 코드 생성 (소문자 영숫자 26자)
pub fn generate_embed_code() -> String {
    let mut rng = rand::thread_rng();
    let index = Uniform::from(0..EMBED_CODE_ALPHABET.len());

    (0..EMBED_CODE_LENGTH)
        .map(|_| EMBED_CODE_ALPHABET[index.sample(&mut rng)] as char)
        .collect()
}

/// 임베드 코드의 공개 경로
pub fn embed_path(embed_code: &str) -> String {
    format!("/embed/{}", embed_code)
}

/// 스크립트 문자열 안에 그대로 넣어도 되는 식별자인지
///
/// 로더 스크립트는 식별자를 따옴표 안에 그대로 삽입하므로 영숫자, `-`, `_`만 허용합니다.
pub fn is_script_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// 폼 ID로 iframe을 붙이는 로더 스크립트
pub fn loader_script(form_id: &str, base_url: &str) -> String {
    LOADER_TEMPLATE
        .replace("{{FORM_ID}}", form_id)
        .replace("{{BASE_URL}}", base_url)
}

/// 임베드 코드로 iframe을 붙이는 인라인 스크립트 (resize 메시지를 `embedCode`로 매칭)
pub fn inline_embed_script(embed_code: &str, base_url: &str) -> String {
    INLINE_TEMPLATE
        .replace("{{EMBED_CODE}}", embed_code)
        .replace("{{BASE_URL}}", base_url)
}

/// 컨테이너 `<div>`와 로더 `<script>` 태그
pub fn form_snippet(form_id: &str, base_url: &str) -> String {
    format!(
        "<div id=\"ai-form-{id}\"></div>\n<script src=\"{base}/embed.js?id={id}\"></script>",
        id = form_id,
        base = base_url
    )
}

/// 임베드 코드 직접 URL을 띄우는 iframe 태그
pub fn iframe_snippet(embed_code: &str, base_url: &str) -> String {
    format!(
        "<iframe src=\"{}{}\" width=\"100%\" height=\"600\" frameborder=\"0\"></iframe>",
        base_url,
        embed_path(embed_code)
    )
}

/// 공개 폼 페이지 URL
pub fn form_url(form_id: &str, base_url: &str) -> String {
    format!("{}/forms/{}", base_url, form_id)
}
