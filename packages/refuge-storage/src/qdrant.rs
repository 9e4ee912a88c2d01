use std::collections::HashMap;

use qdrant_client::{
	Payload,
	qdrant::{
		Condition, CreateCollectionBuilder, CreateFieldIndexCollection, Direction, Distance,
		FieldType, Filter, OrderBy, PayloadSchemaType, PointStruct, Query, QueryPointsBuilder,
		ScrollPointsBuilder, UpsertPointsBuilder, Vector, VectorParamsBuilder, VectorsConfigBuilder,
	},
};

use refuge_domain::{Resource, ResourceCategory, UrgencyLevel};

use crate::{Error, Result, payload};

pub const DENSE_VECTOR_NAME: &str = "dense";
pub const RECENCY_FIELD: &str = "last_updated";

/// Payload indexes used by filters and ordered scrolls.
const PAYLOAD_INDEXES: [(&str, PayloadSchemaType, FieldType); 3] = [
	("category", PayloadSchemaType::Keyword, FieldType::Keyword),
	("urgency_level", PayloadSchemaType::Keyword, FieldType::Keyword),
	(RECENCY_FIELD, PayloadSchemaType::Datetime, FieldType::Datetime),
];

/// Namespace for deriving stable point ids from resource ids.
const RESOURCE_ID_NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x6f1e_2c8a_4b7d_4e1f_9a35_0c2d_8e4b_71a6);

/// Exact-match payload filter pushed down to the vector store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceFilter {
	pub categories: Vec<ResourceCategory>,
	pub urgency: Option<UrgencyLevel>,
}
impl ResourceFilter {
	pub fn category(category: ResourceCategory) -> Self {
		Self { categories: vec![category], urgency: None }
	}

	pub fn urgency(urgency: UrgencyLevel) -> Self {
		Self { categories: Vec::new(), urgency: Some(urgency) }
	}

	pub fn is_empty(&self) -> bool {
		self.categories.is_empty() && self.urgency.is_none()
	}

	pub fn to_qdrant(&self) -> Option<Filter> {
		let mut conditions = Vec::new();

		if !self.categories.is_empty() {
			let categories: Vec<String> =
				self.categories.iter().map(|category| category.as_str().to_string()).collect();

			conditions.push(Condition::matches("category", categories));
		}
		if let Some(urgency) = self.urgency {
			conditions.push(Condition::matches("urgency_level", urgency.as_str().to_string()));
		}

		(!conditions.is_empty()).then(|| Filter::all(conditions))
	}
}

#[derive(Clone, Debug)]
pub struct ScoredResource {
	pub resource: Resource,
	pub score: f32,
}

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &refuge_config::Qdrant) -> Result<Self> {
		let client =
			qdrant_client::Qdrant::from_url(&cfg.url).api_key(cfg.api_key.clone()).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	pub fn point_id(resource_id: &str) -> uuid::Uuid {
		uuid::Uuid::new_v5(&RESOURCE_ID_NAMESPACE, resource_id.as_bytes())
	}

	/// Creates the collection with cosine distance when it does not exist yet, then makes sure
	/// the payload indexes exist. Returns whether the collection was created.
	pub async fn ensure_collection(&self) -> Result<bool> {
		if self.client.collection_exists(self.collection.clone()).await? {
			self.ensure_payload_indexes().await?;

			return Ok(false);
		}

		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DENSE_VECTOR_NAME,
			VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
		);

		let builder =
			CreateCollectionBuilder::new(self.collection.clone()).vectors_config(vectors_config);

		self.client.create_collection(builder).await?;

		tracing::info!(collection = %self.collection, vector_dim = self.vector_dim, "Created collection.");

		self.ensure_payload_indexes().await?;

		Ok(true)
	}

	async fn ensure_payload_indexes(&self) -> Result<()> {
		let payload_schema = self
			.client
			.collection_info(self.collection.clone())
			.await?
			.result
			.map(|info| info.payload_schema)
			.unwrap_or_default();

		for (field_name, payload_type, index_type) in PAYLOAD_INDEXES {
			let present = payload_schema
				.get(field_name)
				.is_some_and(|schema| schema.data_type == payload_type as i32);

			if present {
				continue;
			}

			let request = CreateFieldIndexCollection {
				collection_name: self.collection.clone(),
				wait: Some(true),
				field_name: field_name.to_string(),
				field_type: Some(index_type as i32),
				field_index_params: None,
				ordering: None,
			};

			self.client.create_field_index(request).await?;

			tracing::info!(collection = %self.collection, field_name, "Created payload index.");
		}

		Ok(())
	}

	pub async fn upsert(&self, resources: &[Resource], vectors: &[Vec<f32>]) -> Result<usize> {
		if resources.len() != vectors.len() {
			return Err(Error::InvalidArgument(format!(
				"Got {} vectors for {} resources.",
				vectors.len(),
				resources.len()
			)));
		}

		let mut points = Vec::with_capacity(resources.len());

		for (resource, vec) in resources.iter().zip(vectors.iter()) {
			self.validate_vector_dim(vec)?;

			let payload = Payload::from(payload::resource_to_payload(resource)?);
			let mut vector_map = HashMap::new();

			vector_map.insert(DENSE_VECTOR_NAME.to_string(), Vector::from(vec.to_vec()));

			points.push(PointStruct::new(
				Self::point_id(&resource.id).to_string(),
				vector_map,
				payload,
			));
		}

		let count = points.len();

		if count == 0 {
			return Ok(0);
		}

		let upsert = UpsertPointsBuilder::new(self.collection.clone(), points).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(count)
	}

	/// Nearest-neighbour search. Malformed payloads are dropped from the result.
	pub async fn search(
		&self,
		vector: &[f32],
		filter: &ResourceFilter,
		limit: usize,
	) -> Result<Vec<ScoredResource>> {
		self.validate_vector_dim(vector)?;

		let mut search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector.to_vec()))
			.using(DENSE_VECTOR_NAME)
			.limit(limit as u64)
			.with_payload(true);

		if let Some(filter) = filter.to_qdrant() {
			search = search.filter(filter);
		}

		let response = self.client.query(search).await?;

		Ok(response
			.result
			.into_iter()
			.filter_map(|point| {
				payload::payload_to_resource(point.payload)
					.map(|resource| ScoredResource { resource, score: point.score })
			})
			.collect())
	}

	/// Pure payload-filter lookup that bypasses embedding. Points come back most recently
	/// updated first.
	pub async fn scroll(&self, filter: &ResourceFilter, limit: usize) -> Result<Vec<Resource>> {
		let mut scroll = ScrollPointsBuilder::new(self.collection.clone())
			.limit(limit as u32)
			.order_by(recent_first())
			.with_payload(true)
			.with_vectors(false);

		if let Some(filter) = filter.to_qdrant() {
			scroll = scroll.filter(filter);
		}

		let response = self.client.scroll(scroll).await?;

		Ok(response
			.result
			.into_iter()
			.filter_map(|point| payload::payload_to_resource(point.payload))
			.collect())
	}

	fn validate_vector_dim(&self, vec: &[f32]) -> Result<()> {
		if vec.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Vector dimension mismatch. Expected {}, got {}.",
				self.vector_dim,
				vec.len()
			)));
		}

		Ok(())
	}
}

fn recent_first() -> OrderBy {
	OrderBy {
		key: RECENCY_FIELD.to_string(),
		direction: Some(Direction::Desc as i32),
		start_from: None,
	}
}

#[cfg(test)]
mod tests {
	use qdrant_client::qdrant::Direction;

	use refuge_domain::{ResourceCategory, UrgencyLevel};

	use crate::qdrant::{self, QdrantStore, RECENCY_FIELD, ResourceFilter};

	#[test]
	fn scrolls_order_by_recency_descending() {
		let order = qdrant::recent_first();

		assert_eq!(order.key, RECENCY_FIELD);
		assert_eq!(order.direction, Some(Direction::Desc as i32));
		assert!(order.start_from.is_none());
	}

	#[test]
	fn point_ids_are_stable_per_resource() {
		assert_eq!(QdrantStore::point_id("legal_001"), QdrantStore::point_id("legal_001"));
		assert_ne!(QdrantStore::point_id("legal_001"), QdrantStore::point_id("legal_002"));
	}

	#[test]
	fn empty_filter_is_not_pushed_down() {
		assert!(ResourceFilter::default().to_qdrant().is_none());
		assert!(ResourceFilter::default().is_empty());
	}

	#[test]
	fn filter_combines_category_set_and_urgency() {
		let filter = ResourceFilter {
			categories: vec![ResourceCategory::Housing, ResourceCategory::LegalAid],
			urgency: Some(UrgencyLevel::High),
		};
		let qdrant = filter.to_qdrant().expect("Filter must be built.");

		assert_eq!(qdrant.must.len(), 2);
		assert!(qdrant.should.is_empty());
		assert!(ResourceFilter::urgency(UrgencyLevel::Critical).to_qdrant().is_some());
	}
}
