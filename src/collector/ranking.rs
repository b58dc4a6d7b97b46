use super::features::AudioFeature;
use super::track::{FeatureSource, Track};
use super::CollectorError;
use serde::Serialize;

/// One track projected onto a single feature.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureRanking {
    pub selected_feature: AudioFeature,
    pub feature_value: f64,
    pub name: String,
    pub track_id: String,
}

/// Flattens the allow-listed audio features of every track, in place.
/// Running it again yields the same values.
pub fn serialize_tracks(tracks: &mut [Track]) {
    for track in tracks.iter_mut() {
        track.serialize_features();
    }
}

/// Validates `feature_name` against the allow-list, then ranks `tracks` by it.
pub fn sort_tracks_by_audio_feature<T: FeatureSource>(
    feature_name: &str,
    tracks: &[T],
) -> Result<Vec<FeatureRanking>, CollectorError> {
    let feature: AudioFeature = feature_name.parse()?;
    sort_tracks_by_feature(feature, tracks)
}

/// Projects every track onto `feature` and sorts ascending by value.
/// Ties keep input order.
pub fn sort_tracks_by_feature<T: FeatureSource>(
    feature: AudioFeature,
    tracks: &[T],
) -> Result<Vec<FeatureRanking>, CollectorError> {
    let mut rankings = tracks
        .iter()
        .map(|track| {
            let feature_value =
                track
                    .feature_value(feature)
                    .ok_or_else(|| CollectorError::MissingFeature {
                        track: track.track_id().to_string(),
                        feature,
                    })?;
            Ok(FeatureRanking {
                selected_feature: feature,
                feature_value,
                name: track.track_name().to_string(),
                track_id: track.track_id().to_string(),
            })
        })
        .collect::<Result<Vec<_>, CollectorError>>()?;

    rankings.sort_by(|a, b| a.feature_value.total_cmp(&b.feature_value));
    Ok(rankings)
}
