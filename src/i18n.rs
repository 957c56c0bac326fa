//! Bilingual (zh/en) display strings for the survey.
//!
//! Every string the builder, switcher and completion handler show lives in a
//! `StringTable`. The two tables are plain statics; `lookup` never fails and falls
//! back to the default language for anything it does not recognize.

use serde::{Deserialize, Serialize};

/// Supported survey languages. The set is closed: the switcher cycles between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  #[default]
  Zh,
  En,
}

impl Language {
  #[cfg(test)]
  pub const ALL: [Language; 2] = [Language::Zh, Language::En];

  pub fn code(self) -> &'static str {
    match self {
      Language::Zh => "zh",
      Language::En => "en",
    }
  }

  /// Strict parse; `None` for anything outside the supported set.
  pub fn parse(code: &str) -> Option<Language> {
    match code.trim().to_ascii_lowercase().as_str() {
      "zh" => Some(Language::Zh),
      "en" => Some(Language::En),
      _ => None,
    }
  }

  /// Lenient parse used at every boundary: unknown codes become the default language.
  pub fn resolve(code: &str) -> Language {
    Language::parse(code).unwrap_or_default()
  }

  pub fn toggle(self) -> Language {
    match self {
      Language::Zh => Language::En,
      Language::En => Language::Zh,
    }
  }

  pub fn strings(self) -> &'static StringTable {
    StringTable::for_language(self)
  }
}

impl std::fmt::Display for Language {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.code())
  }
}

/// Title + description pair shared by the comparative image questions.
#[derive(Debug, Serialize)]
pub struct Prompt {
  pub title: &'static str,
  pub desc: &'static str,
}

/// Every display string of the survey, for one language.
#[derive(Debug, Serialize)]
pub struct StringTable {
  // Survey
  pub survey_title: &'static str,
  pub survey_description: &'static str,
  pub privacy_notice: &'static str,

  // Navigation + switcher
  pub language_switch: &'static str,
  pub language_switch_tooltip: &'static str,
  pub next: &'static str,
  pub previous: &'static str,
  pub complete: &'static str,

  // Pages
  pub demographics: Prompt,
  pub thermal_affordance: Prompt,
  pub environmental_assessment: Prompt,
  pub design_quality: Prompt,
  pub emotional_response: Prompt,
  pub feature_ranking: Prompt,

  // Demographic questions
  pub community_type: &'static str,
  pub gender: &'static str,
  pub age: &'static str,
  pub residence_duration: &'static str,
  pub outdoor_activity: &'static str,

  pub high_dense: &'static str,
  pub high_open: &'static str,
  pub mid_dense: &'static str,
  pub mid_open: &'static str,
  pub low_dense: &'static str,
  pub low_open: &'static str,
  pub mixed: &'static str,
  pub uncertain: &'static str,

  pub male: &'static str,
  pub female: &'static str,

  pub under_18: &'static str,
  pub age_18_to_24: &'static str,
  pub age_25_to_30: &'static str,
  pub age_31_to_40: &'static str,
  pub age_41_to_50: &'static str,
  pub age_51_to_60: &'static str,
  pub over_61: &'static str,

  pub less_than_1_year: &'static str,
  pub one_to_three_years: &'static str,
  pub three_to_five_years: &'static str,
  pub five_to_ten_years: &'static str,
  pub more_than_ten_years: &'static str,

  pub daily: &'static str,
  pub several_times_week: &'static str,
  pub once_week: &'static str,
  pub several_times_month: &'static str,
  pub rarely: &'static str,
  pub never: &'static str,

  // Instructions
  pub thermal_instruction: Prompt,
  pub environmental_instruction: &'static str,

  // Comparative image questions
  pub thermal_comfort: Prompt,
  pub summer_walk: Prompt,
  pub temperature_intensity: Prompt,
  pub sunshine_intensity: Prompt,
  pub humidity_inference: Prompt,
  pub wind_inference: Prompt,
  pub traffic_flow: Prompt,
  pub greenery_rate: Prompt,
  pub shading_area: Prompt,
  pub material_comfort: Prompt,
  pub imageability: Prompt,
  pub enclosure: Prompt,
  pub human_scale: Prompt,
  pub transparency: Prompt,
  pub complexity: Prompt,
  pub safe_feeling: Prompt,
  pub beautiful_feeling: Prompt,
  pub lively_feeling: Prompt,
  pub wealthy_feeling: Prompt,
  pub boring_feeling: Prompt,
  pub depressing_feeling: Prompt,

  // Rating scale
  pub comfort_level: &'static str,
  pub very_uncomfortable: &'static str,
  pub uncomfortable: &'static str,
  pub neutral: &'static str,
  pub comfortable: &'static str,
  pub very_comfortable: &'static str,

  // Street element checklist
  pub visible_elements: &'static str,
  pub element_trees: &'static str,
  pub element_furniture: &'static str,
  pub element_bike_lanes: &'static str,
  pub element_crosswalks: &'static str,
  pub element_public_art: &'static str,
  pub element_commercial: &'static str,
  pub element_residential: &'static str,
  pub element_parking: &'static str,
  pub element_transit: &'static str,
  pub element_outdoor_dining: &'static str,

  // Ranking
  pub thermal_comfort_factors: &'static str,
  pub shading: &'static str,
  pub greenery: &'static str,
  pub ventilation: &'static str,
  pub building_layout: &'static str,
  pub water_features: &'static str,
  pub pavement_material: &'static str,
  pub street_width: &'static str,

  // Open feedback
  pub general_feedback: Prompt,

  // Completion
  pub thank_you: &'static str,
  pub save_error: &'static str,
}

impl StringTable {
  pub fn for_language(lang: Language) -> &'static StringTable {
    match lang {
      Language::Zh => &ZH,
      Language::En => &EN,
    }
  }
}

/// Table for `code`, or the default-language table when the code is not supported.
#[cfg(test)]
pub fn lookup(code: &str) -> &'static StringTable {
  StringTable::for_language(Language::resolve(code))
}

pub static ZH: StringTable = StringTable {
  survey_title: "住区街景热舒适感知调研",
  survey_description: "您好！我们正在进行一项关于不同类型住区街道热舒适感知的研究。该研究旨在了解哪些空间要素影响人们的热舒适感受。您的参与将为构建更舒适、可持续的城市居住环境提供科学依据。调研预计需要10-15分钟。",
  privacy_notice: "您的回答将被严格保密，仅用于研究目的。",

  language_switch: "English",
  language_switch_tooltip: "Switch to English",
  next: "下一页",
  previous: "上一页",
  complete: "完成问卷",

  demographics: Prompt {
    title: "第一部分：背景信息",
    desc: "请提供一些关于您和您的住区的基本信息。这将帮助我们更好地理解不同类型住区的热舒适感知差异。",
  },
  thermal_affordance: Prompt {
    title: "第二部分：热舒适感知评估",
    desc: "请根据您的直觉感受，评估下列街道环境的热舒适性。",
  },
  environmental_assessment: Prompt {
    title: "第三部分：环境要素评估",
    desc: "请评估下列街道环境的各种物理要素。",
  },
  design_quality: Prompt {
    title: "第四部分：空间设计质量",
    desc: "请评估街道空间的设计质量和空间特征。",
  },
  emotional_response: Prompt {
    title: "第五部分：情感反应评估",
    desc: "请评估街道环境引发的情感反应。",
  },
  feature_ranking: Prompt {
    title: "第六部分：热舒适影响因素重要性排序",
    desc: "请按照对您的热舒适感受的重要性，对以下因素进行排序。",
  },

  community_type: "您居住的住区类型是？",
  gender: "您的性别是？",
  age: "您的年龄是？",
  residence_duration: "您在当前城市居住了多长时间？",
  outdoor_activity: "您在住区内进行户外活动的频率？",

  high_dense: "高层密集住区（高楼密集布局）",
  high_open: "高层开放住区（高楼疏散布局）",
  mid_dense: "多层密集住区（中高楼密集布局）",
  mid_open: "多层开放住区（中高楼疏散布局）",
  low_dense: "低层密集住区（低楼密集布局）",
  low_open: "低层开放住区（低楼疏散布局）",
  mixed: "混合型住区（多种建筑类型混合）",
  uncertain: "不确定",

  male: "男",
  female: "女",

  under_18: "18岁以下",
  age_18_to_24: "18~24岁",
  age_25_to_30: "25~30岁",
  age_31_to_40: "31~40岁",
  age_41_to_50: "41~50岁",
  age_51_to_60: "51~60岁",
  over_61: "61岁及以上",

  less_than_1_year: "少于1年",
  one_to_three_years: "1-3年",
  three_to_five_years: "3-5年",
  five_to_ten_years: "5-10年",
  more_than_ten_years: "10年以上",

  daily: "每天",
  several_times_week: "每周几次",
  once_week: "每周一次",
  several_times_month: "每月几次",
  rarely: "很少",
  never: "从不",

  thermal_instruction: Prompt {
    title: "在本部分中，您将看到不同的街道环境。请想象您在这些街道上步行的感受，选择更舒适的环境。",
    desc: "请考虑阴影、绿化、建筑布局等因素对热舒适的影响。",
  },
  environmental_instruction: "请比较两张图片，选择在每个维度上更突出的街道环境。",

  thermal_comfort: Prompt { title: "热舒适性总体评估", desc: "哪个街道环境您感知具有更舒适的户外热环境？" },
  summer_walk: Prompt { title: "夏季步行选择", desc: "炎热的夏日午后，您愿意在以下哪些街道步行？（可多选）" },
  temperature_intensity: Prompt { title: "温度强度感知", desc: "哪个街道环境您感知温度更高？" },
  sunshine_intensity: Prompt { title: "辐射感知", desc: "哪个街道环境您感知辐射更强烈？" },
  humidity_inference: Prompt { title: "湿度感知", desc: "哪个街道环境您感知湿度更高？" },
  wind_inference: Prompt { title: "风速感知", desc: "哪个街道环境您感知风速更大？" },
  traffic_flow: Prompt { title: "交通流量感知", desc: "哪个街道环境传达出更高的交通流量？" },
  greenery_rate: Prompt { title: "绿化率感知", desc: "哪个街道环境具有更高的绿化率？" },
  shading_area: Prompt { title: "阴影区域感知", desc: "哪个街道环境提供更多的阴影区域？" },
  material_comfort: Prompt { title: "建筑材料舒适度", desc: "哪个街道环境的建筑材料看起来更舒适？" },
  imageability: Prompt { title: "可识别性", desc: "哪个街道环境更具特色和记忆点？" },
  enclosure: Prompt { title: "围合度", desc: "哪个街道环境具有更好的空间围合感？" },
  human_scale: Prompt { title: "人性尺度", desc: "哪个街道环境更适合人的步行尺度？" },
  transparency: Prompt { title: "通透性", desc: "哪个街道环境的视觉通透性更好？" },
  complexity: Prompt { title: "复杂性", desc: "哪个街道环境的视觉复杂性更高？" },
  safe_feeling: Prompt { title: "安全感", desc: "哪个街道环境让您感觉更安全？" },
  beautiful_feeling: Prompt { title: "美观感", desc: "哪个街道环境让您感觉更美观？" },
  lively_feeling: Prompt { title: "活力感", desc: "哪个街道环境让您感觉更有活力？" },
  wealthy_feeling: Prompt { title: "富裕感", desc: "哪个街道环境让您感觉更富裕？" },
  boring_feeling: Prompt { title: "无聊感", desc: "哪个街道环境让您感觉更无聊？" },
  depressing_feeling: Prompt { title: "压抑感", desc: "哪个街道环境让您感觉更压抑？" },

  comfort_level: "在这条街道上步行您会感到多舒适？",
  very_uncomfortable: "非常不舒适",
  uncomfortable: "不舒适",
  neutral: "一般",
  comfortable: "舒适",
  very_comfortable: "非常舒适",

  visible_elements: "您在这条街道中注意到了哪些元素？（可多选）",
  element_trees: "树木和植被",
  element_furniture: "街道家具（长凳、路灯等）",
  element_bike_lanes: "自行车道",
  element_crosswalks: "人行横道",
  element_public_art: "公共艺术或装饰",
  element_commercial: "商业建筑",
  element_residential: "住宅建筑",
  element_parking: "停车位",
  element_transit: "公共交通站点",
  element_outdoor_dining: "户外餐饮区域",

  thermal_comfort_factors: "请拖拽排序以下影响热舒适的因素，从最重要（顶部）到最不重要（底部）：",
  shading: "阴影遮阳",
  greenery: "绿化植被",
  ventilation: "自然通风",
  building_layout: "建筑密度和布局",
  water_features: "水体或喷泉",
  pavement_material: "环境材料和颜色",
  street_width: "街道宽度和开放性",

  general_feedback: Prompt {
    title: "什么使街道环境让您在炎热天气中感到舒适？（可选）",
    desc: "请分享您对街道设计、遮阳绿化或其他对您重要的方面的想法。",
  },

  thank_you: "感谢您完成问卷！您的回答已保存。",
  save_error: "保存回答时出现错误，请重试。",
};

pub static EN: StringTable = StringTable {
  survey_title: "Street Thermal Comfort Perception Survey",
  survey_description: "Hello! We are conducting a study on thermal comfort perception in different types of residential neighborhoods. This research aims to understand which spatial elements affect people's thermal comfort perception. Your participation will provide scientific evidence for building more comfortable and sustainable urban living environments. The survey takes approximately 10-15 minutes.",
  privacy_notice: "Your answers will be kept strictly confidential and used for research purposes only.",

  language_switch: "中文",
  language_switch_tooltip: "切换到中文",
  next: "Next",
  previous: "Previous",
  complete: "Complete",

  demographics: Prompt {
    title: "Part 1: Background Information",
    desc: "Please provide some basic information about you and your residential community. This will help us better understand thermal comfort perception differences across different neighborhood types.",
  },
  thermal_affordance: Prompt {
    title: "Part 2: Thermal Comfort Assessment",
    desc: "Please evaluate the thermal comfort of the following street environments based on your intuitive feelings.",
  },
  environmental_assessment: Prompt {
    title: "Part 3: Environmental Elements Assessment",
    desc: "Please evaluate various physical elements of the following street environments.",
  },
  design_quality: Prompt {
    title: "Part 4: Spatial Design Quality",
    desc: "Please evaluate the design quality and spatial characteristics of the street spaces.",
  },
  emotional_response: Prompt {
    title: "Part 5: Emotional Response Assessment",
    desc: "Please evaluate the emotional responses evoked by the street environments.",
  },
  feature_ranking: Prompt {
    title: "Part 6: Thermal Comfort Factor Importance Ranking",
    desc: "Please rank the following factors according to their importance to your thermal comfort perception.",
  },

  community_type: "What type of residential community do you live in?",
  gender: "What is your gender?",
  age: "What is your age?",
  residence_duration: "How long have you lived in your current city?",
  outdoor_activity: "How frequently do you engage in outdoor activities in your residential community?",

  high_dense: "High-rise Dense Community (Dense high-rise layout)",
  high_open: "High-rise Open Community (Scattered high-rise layout)",
  mid_dense: "Mid-rise Dense Community (Dense mid-rise layout)",
  mid_open: "Mid-rise Open Community (Scattered mid-rise layout)",
  low_dense: "Low-rise Dense Community (Dense low-rise layout)",
  low_open: "Low-rise Open Community (Scattered low-rise layout)",
  mixed: "Mixed-type Community (Various building types mixed)",
  uncertain: "Uncertain",

  male: "Male",
  female: "Female",

  under_18: "Under 18",
  age_18_to_24: "18-24",
  age_25_to_30: "25-30",
  age_31_to_40: "31-40",
  age_41_to_50: "41-50",
  age_51_to_60: "51-60",
  over_61: "61 and above",

  less_than_1_year: "Less than 1 year",
  one_to_three_years: "1-3 years",
  three_to_five_years: "3-5 years",
  five_to_ten_years: "5-10 years",
  more_than_ten_years: "More than 10 years",

  daily: "Daily",
  several_times_week: "Several times a week",
  once_week: "Once a week",
  several_times_month: "Several times a month",
  rarely: "Rarely",
  never: "Never",

  thermal_instruction: Prompt {
    title: "In this section, you will see different street environments. Please imagine how you would feel walking on these streets and choose the more comfortable environment.",
    desc: "Please consider the impact of factors such as shade, greenery, and building layout on thermal comfort.",
  },
  environmental_instruction: "Please compare the two images and select the street environment that is more prominent in each dimension.",

  thermal_comfort: Prompt { title: "Overall Thermal Comfort Assessment", desc: "Which street environment do you perceive as having a more comfortable outdoor thermal environment?" },
  summer_walk: Prompt { title: "Summer Walk Choice", desc: "On a hot summer afternoon, which of these streets would you be willing to walk along? (select all that apply)" },
  temperature_intensity: Prompt { title: "Temperature Intensity Perception", desc: "Which street environment do you perceive as having higher temperature?" },
  sunshine_intensity: Prompt { title: "Solar Radiation Perception", desc: "Which street environment do you perceive as having stronger solar radiation?" },
  humidity_inference: Prompt { title: "Humidity Perception", desc: "Which street environment do you perceive as having higher humidity?" },
  wind_inference: Prompt { title: "Wind Speed Perception", desc: "Which street environment do you perceive as having stronger wind?" },
  traffic_flow: Prompt { title: "Traffic Flow Perception", desc: "Which street environment conveys higher traffic flow?" },
  greenery_rate: Prompt { title: "Greenery Rate Perception", desc: "Which street environment has higher greenery rate?" },
  shading_area: Prompt { title: "Shaded Area Perception", desc: "Which street environment provides more shaded areas?" },
  material_comfort: Prompt { title: "Building Material Comfort", desc: "Which street environment has more comfortable building materials?" },
  imageability: Prompt { title: "Imageability", desc: "Which street environment is more distinctive and memorable?" },
  enclosure: Prompt { title: "Enclosure", desc: "Which street environment has better spatial enclosure?" },
  human_scale: Prompt { title: "Human Scale", desc: "Which street environment is more suitable for pedestrian scale?" },
  transparency: Prompt { title: "Transparency", desc: "Which street environment has better visual transparency?" },
  complexity: Prompt { title: "Complexity", desc: "Which street environment has higher visual complexity?" },
  safe_feeling: Prompt { title: "Safety", desc: "Which street environment makes you feel safer?" },
  beautiful_feeling: Prompt { title: "Beauty", desc: "Which street environment makes you feel it's more beautiful?" },
  lively_feeling: Prompt { title: "Liveliness", desc: "Which street environment makes you feel more lively?" },
  wealthy_feeling: Prompt { title: "Wealth", desc: "Which street environment makes you feel more wealthy?" },
  boring_feeling: Prompt { title: "Boredom", desc: "Which street environment makes you feel more bored?" },
  depressing_feeling: Prompt { title: "Depression", desc: "Which street environment makes you feel more depressed?" },

  comfort_level: "How comfortable would you feel walking along this street?",
  very_uncomfortable: "Very uncomfortable",
  uncomfortable: "Uncomfortable",
  neutral: "Neutral",
  comfortable: "Comfortable",
  very_comfortable: "Very comfortable",

  visible_elements: "Which elements do you notice in this street? (select all that apply)",
  element_trees: "Trees and vegetation",
  element_furniture: "Street furniture (benches, street lights, etc.)",
  element_bike_lanes: "Bike lanes",
  element_crosswalks: "Crosswalks",
  element_public_art: "Public art or decoration",
  element_commercial: "Commercial buildings",
  element_residential: "Residential buildings",
  element_parking: "Parking spaces",
  element_transit: "Public transit stops",
  element_outdoor_dining: "Outdoor dining areas",

  thermal_comfort_factors: "Please drag to rank the following factors affecting thermal comfort, from most important (top) to least important (bottom):",
  shading: "Shade and Sun Protection",
  greenery: "Greenery and Vegetation",
  ventilation: "Natural Ventilation",
  building_layout: "Building Density and Layout",
  water_features: "Water Bodies or Fountains",
  pavement_material: "Environmental Materials and Colors",
  street_width: "Street Width and Openness",

  general_feedback: Prompt {
    title: "What makes a street feel comfortable to you in hot weather? (optional)",
    desc: "Please share your thoughts on street design, shade, greenery, or anything else that matters to you.",
  },

  thank_you: "Thank you for completing the survey! Your responses have been saved.",
  save_error: "There was an error saving your responses. Please try again.",
};
